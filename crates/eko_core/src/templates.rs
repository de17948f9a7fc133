//! Outreach e-mail template library for the resources page.
//!
//! Templates carry bracketed placeholders such as `[First Name]`. Rendering
//! substitutes the ones a caller supplies and leaves the rest visible so the
//! sender can spot what is still missing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]\n]+)\]").expect("valid placeholder regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fi,
}

impl Language {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "fi" | "finnish" | "suomi" => Some(Self::Fi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmailTemplate {
    pub id: &'static str,
    pub language: Language,
    pub title: &'static str,
    pub subject: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

static TEMPLATES: &[EmailTemplate] = &[
    EmailTemplate {
        id: "website-intro-en",
        language: Language::En,
        title: "Website introduction",
        subject: "A faster website for [Their Business Name]",
        body: "Hi [First Name],

I had a look at [Their Business Name] online and think your website could be bringing in more customers than it does today.

At [Your Company Name] we build fast, mobile-friendly sites with clear calls to action, so visitors turn into enquiries.

Would a 15 minute call next week work for you?

Best regards,
[Your Name]
[Your Company Name]
[Your Email] | [Your Phone]",
    },
    EmailTemplate {
        id: "custom-solutions-en",
        language: Language::En,
        title: "Custom website follow-up",
        subject: "Custom website solutions for [Their Business Name]",
        body: "Hi [First Name],

Many businesses in [Industry] outgrow template websites quickly. We recently helped [Similar Client] grow their online leads by [X%] in [Timeframe].

If that sounds useful, reply here or book a time at [Booking Link].

Best regards,
[Your Name]
[Your Company Name]",
    },
    EmailTemplate {
        id: "website-intro-fi",
        language: Language::Fi,
        title: "Verkkosivuesittely",
        subject: "Nopeampi verkkosivu yritykselle [Yrityksen nimi]",
        body: "Hei [Etunimi],

Tutustuin yritykseen [Yrityksen nimi] ja uskon, että verkkosivunne voisi tuoda nykyistä enemmän asiakkaita.

[Yrityksesi nimi] rakentaa nopeita ja mobiiliystävällisiä sivustoja, joissa on selkeät toimintakehotteet.

Sopisiko 15 minuutin puhelu ensi viikolla?

Ystävällisin terveisin,
[Nimesi]
[Yrityksesi nimi]
[Sähköpostisi] | [Puhelinnumerosi]",
    },
    EmailTemplate {
        id: "custom-solutions-fi",
        language: Language::Fi,
        title: "Räätälöity verkkosivu, jatkoviesti",
        subject: "Räätälöidyt verkkosivuratkaisut yritykselle [Yrityksen nimi]",
        body: "Hei [Etunimi],

Monet alan [Ala] yritykset kasvavat nopeasti ulos valmispohjista. Autoimme hiljattain asiakasta [Vastaava asiakas] kasvattamaan verkkoliidejään [X%] ajassa [Aikajakso].

Jos tämä kiinnostaa, vastaa tähän viestiin tai varaa aika osoitteessa [Varauslinkki].

Ystävällisin terveisin,
[Nimesi]
[Yrityksesi nimi]",
    },
];

pub fn all_templates() -> &'static [EmailTemplate] {
    TEMPLATES
}

pub fn templates_for(language: Language) -> impl Iterator<Item = &'static EmailTemplate> {
    TEMPLATES
        .iter()
        .filter(move |template| template.language == language)
}

pub fn find_template(id: &str) -> Option<&'static EmailTemplate> {
    TEMPLATES.iter().find(|template| template.id == id)
}

/// Distinct placeholder names in subject-then-body order of first use.
pub fn placeholders(template: &EmailTemplate) -> Vec<String> {
    let mut seen = HashSet::new();
    [template.subject, template.body]
        .into_iter()
        .flat_map(|text| PLACEHOLDER_RE.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Fills known placeholders; unknown or blank values keep the brackets.
pub fn render(template: &EmailTemplate, values: &HashMap<String, String>) -> RenderedEmail {
    RenderedEmail {
        subject: fill(template.subject, values),
        body: fill(template.body, values),
    }
}

fn fill(text: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            values
                .get(&caps[1])
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}
