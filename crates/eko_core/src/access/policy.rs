//! Role hierarchy plus allow-rules, parsed from a line-oriented text form.
//!
//! ```text
//! g, child_role, parent_role
//! p, role, object, action-regex
//! ```
//!
//! Blank lines and lines starting with `//` or `#` are ignored.
//!
//! # Invariants
//! - A subject holds its own role and every role reachable through `g`
//!   edges; cycles terminate.
//! - The effect is "some allow": one matching rule grants access.

use crate::access::matcher::{compile_action_pattern, key_match};
use log::info;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Built-in roles and rules for the dashboard.
pub const DEFAULT_POLICY: &str = "
// roles
g, pilot, guest
g, staff, pilot
g, admin, staff
g, CEO, admin

// public pages
p, guest, home, (list)|(show)
p, guest, blog, (list)|(show)

// signed-in members
p, pilot, profile, (list)|(show)
p, pilot, profile/*, edit

// public blog authoring
p, admin, blog, create
p, admin, blog/*, (edit)|(delete)

// dashboard
p, admin, dash, list
p, admin, todolist, (list)|(show)
p, admin, todolist/*, (edit)|(delete)|(show)
p, admin, notes, (list)|(show)
p, admin, notes/*, (edit)|(delete)|(show)
p, admin, crm_dropdown, (list)|(show)
p, admin, prospects, (list)|(create)
p, admin, prospects/*, (edit)|(delete)|(show)
p, admin, blogs, (list)|(show)|(create)
p, admin, blogs/*, (edit)|(delete)|(show)
p, admin, resources_drop, (list)|(show)
p, admin, resources, (list)|(show)
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Wrong field count or an empty field.
    MalformedLine { line: usize, content: String },
    /// Leading field is neither `g` nor `p`.
    UnknownKind { line: usize, kind: String },
    InvalidActionPattern {
        line: usize,
        pattern: String,
        message: String,
    },
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine { line, content } => {
                write!(f, "malformed policy line {line}: `{content}`")
            }
            Self::UnknownKind { line, kind } => {
                write!(f, "unknown policy kind `{kind}` on line {line}")
            }
            Self::InvalidActionPattern {
                line,
                pattern,
                message,
            } => write!(
                f,
                "invalid action pattern `{pattern}` on line {line}: {message}"
            ),
        }
    }
}

impl Error for PolicyError {}

/// One `p` line.
#[derive(Debug, Clone)]
pub struct PolicyRule {
    pub subject: String,
    pub object: String,
    pub action_pattern: String,
    action_re: Regex,
}

impl PolicyRule {
    pub fn allows(&self, object: &str, action: &str) -> bool {
        key_match(object, &self.object) && self.action_re.is_match(action)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    /// child role -> direct parent roles
    parents: BTreeMap<String, BTreeSet<String>>,
    rules: Vec<PolicyRule>,
}

impl AccessPolicy {
    pub fn parse(text: &str) -> Result<Self, PolicyError> {
        let mut policy = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with("//") || content.starts_with('#') {
                continue;
            }

            let fields = content.split(',').map(str::trim).collect::<Vec<_>>();
            let malformed = || PolicyError::MalformedLine {
                line,
                content: content.to_string(),
            };
            if fields.iter().any(|field| field.is_empty()) {
                return Err(malformed());
            }

            match fields[0] {
                "g" => {
                    let [_, child, parent] = fields[..] else {
                        return Err(malformed());
                    };
                    policy
                        .parents
                        .entry(child.to_string())
                        .or_default()
                        .insert(parent.to_string());
                }
                "p" => {
                    let [_, subject, object, pattern] = fields[..] else {
                        return Err(malformed());
                    };
                    let action_re = compile_action_pattern(pattern).map_err(|err| {
                        PolicyError::InvalidActionPattern {
                            line,
                            pattern: pattern.to_string(),
                            message: err.to_string(),
                        }
                    })?;
                    policy.rules.push(PolicyRule {
                        subject: subject.to_string(),
                        object: object.to_string(),
                        action_pattern: pattern.to_string(),
                        action_re,
                    });
                }
                other => {
                    return Err(PolicyError::UnknownKind {
                        line,
                        kind: other.to_string(),
                    })
                }
            }
        }

        info!(
            "event=policy_load module=access status=ok role_edges={} rules={}",
            policy.parents.values().map(BTreeSet::len).sum::<usize>(),
            policy.rules.len()
        );
        Ok(policy)
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// `subject` plus every role it inherits, breadth first.
    pub fn roles_of(&self, subject: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([subject.to_string()]);
        while let Some(role) = queue.pop_front() {
            if !seen.insert(role.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&role) {
                queue.extend(parents.iter().filter(|p| !seen.contains(*p)).cloned());
            }
        }
        seen
    }

    pub fn has_role(&self, subject: &str, role: &str) -> bool {
        self.roles_of(subject).contains(role)
    }

    pub fn enforce(&self, subject: &str, object: &str, action: &str) -> bool {
        let roles = self.roles_of(subject);
        self.rules
            .iter()
            .any(|rule| roles.contains(&rule.subject) && rule.allows(object, action))
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessPolicy, PolicyError, DEFAULT_POLICY};

    fn default_policy() -> AccessPolicy {
        AccessPolicy::parse(DEFAULT_POLICY).expect("built-in policy parses")
    }

    #[test]
    fn roles_inherit_transitively() {
        let policy = default_policy();
        assert!(policy.has_role("CEO", "guest"));
        assert!(policy.has_role("staff", "pilot"));
        assert!(!policy.has_role("pilot", "admin"));
    }

    #[test]
    fn enforce_combines_role_object_and_action() {
        let policy = default_policy();
        assert!(policy.enforce("admin", "prospects", "list"));
        assert!(policy.enforce("CEO", "prospects/abc", "edit"));
        assert!(!policy.enforce("admin", "prospects", "edit"));
        assert!(!policy.enforce("staff", "prospects", "list"));
        assert!(policy.enforce("pilot", "home", "show"));
        assert!(policy.enforce("guest", "blog", "list"));
        assert!(!policy.enforce("guest", "blogs", "list"));
        assert!(!policy.enforce("pilot", "profiles/someone-else", "edit"));
        assert!(!policy.enforce("guest", "home", "showall"));
        assert!(!policy.enforce("nobody", "home", "list"));
    }

    #[test]
    fn role_cycles_terminate() {
        let policy = AccessPolicy::parse("g, a, b\ng, b, a\np, b, x, list").expect("parses");
        assert!(policy.enforce("a", "x", "list"));
        assert_eq!(policy.roles_of("a").len(), 2);
    }

    #[test]
    fn parse_rejects_bad_lines_with_line_numbers() {
        assert_eq!(
            AccessPolicy::parse("\np, admin, notes").unwrap_err(),
            PolicyError::MalformedLine {
                line: 2,
                content: "p, admin, notes".to_string()
            }
        );
        assert!(matches!(
            AccessPolicy::parse("x, a, b").unwrap_err(),
            PolicyError::UnknownKind { line: 1, .. }
        ));
        assert!(matches!(
            AccessPolicy::parse("p, a, b, (list").unwrap_err(),
            PolicyError::InvalidActionPattern { line: 1, .. }
        ));
        assert!(matches!(
            AccessPolicy::parse("g, , b").unwrap_err(),
            PolicyError::MalformedLine { line: 1, .. }
        ));
    }
}
