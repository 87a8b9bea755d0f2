use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Choice identifier (stable across edits)
pub type ChoiceId = String;

/// Boolean expression tree behind a [`Rule`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Expr {
    /// Selection contains the choice
    Like { id: ChoiceId },
    Not { rule: Box<Expr> },
    /// Empty conjunction is always true
    And { rules: Vec<Expr> },
    /// Empty disjunction is never true
    Or { rules: Vec<Expr> },
}

impl Expr {
    fn eval(&self, selection: &BTreeSet<&str>) -> bool {
        match self {
            Expr::Like { id } => selection.contains(id.as_str()),
            Expr::Not { rule } => !rule.eval(selection),
            Expr::And { rules } => rules.iter().all(|r| r.eval(selection)),
            Expr::Or { rules } => rules.iter().any(|r| r.eval(selection)),
        }
    }

    fn references(&self, choice_id: &str) -> bool {
        match self {
            Expr::Like { id } => id == choice_id,
            Expr::Not { rule } => rule.references(choice_id),
            Expr::And { rules } | Expr::Or { rules } => {
                rules.iter().any(|r| r.references(choice_id))
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And { rules } | Expr::Or { rules } if rules.len() > 1 => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Like { id } => write!(f, "input like {{{}}}", id),
            Expr::Not { rule } => write!(f, "(!({}))", rule),
            Expr::And { rules } | Expr::Or { rules } if rules.is_empty() => {
                let literal = matches!(self, Expr::And { .. });
                write!(f, "{}", literal)
            }
            Expr::And { rules } | Expr::Or { rules } => {
                let joiner = if matches!(self, Expr::And { .. }) {
                    " && "
                } else {
                    " || "
                };
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    rule.fmt_operand(f)?;
                }
                Ok(())
            }
        }
    }
}

/// Predicate over the set of selected choice ids.
///
/// Rules are opaque: the only way to build one is through
/// [`create_rule_for_ids`], [`invert_rule`] and [`union_rules`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Rule(Expr);

impl Rule {
    /// Evaluate against a candidate selection
    pub fn matches<I, S>(&self, selection: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected: Vec<S> = selection.into_iter().collect();
        let set: BTreeSet<&str> = selected.iter().map(|s| s.as_ref()).collect();
        self.0.eval(&set)
    }

    /// Whether the rule mentions the given choice anywhere
    pub fn references(&self, choice_id: &str) -> bool {
        self.0.references(choice_id)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rule satisfied exactly when the selection contains every id in `required`
/// and none of the ids in `excluded`.
pub fn create_rule_for_ids<R, E>(required: &[R], excluded: &[E]) -> Rule
where
    R: AsRef<str>,
    E: AsRef<str>,
{
    let matching = required.iter().map(|id| Expr::Like {
        id: id.as_ref().to_string(),
    });
    let not_matching = excluded.iter().map(|id| Expr::Not {
        rule: Box::new(Expr::Like {
            id: id.as_ref().to_string(),
        }),
    });

    Rule(Expr::And {
        rules: matching.chain(not_matching).collect(),
    })
}

/// Logical negation
pub fn invert_rule(rule: &Rule) -> Rule {
    Rule(Expr::Not {
        rule: Box::new(rule.0.clone()),
    })
}

/// Logical OR across all rules
pub fn union_rules<I>(rules: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    Rule(Expr::Or {
        rules: rules.into_iter().map(|r| r.0).collect(),
    })
}

/// Ids of `all` that are not in `subset`, in the order of `all`
pub fn set_difference<A, S>(all: &[A], subset: &[S]) -> Vec<ChoiceId>
where
    A: AsRef<str>,
    S: AsRef<str>,
{
    all.iter()
        .map(|id| id.as_ref())
        .filter(|id| !subset.iter().any(|s| s.as_ref() == *id))
        .map(str::to_string)
        .collect()
}
