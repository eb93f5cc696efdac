use crate::config::MatchRule;
use crate::error::ConfigError;
use crate::ports::{ScanObserver, TreeNode};
use crate::selector::Selector;

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub selector: Selector,
    pub priority: u32,
}

/// Result of the selector cascade.
#[derive(Debug, Clone)]
pub struct DirectMatch<N> {
    /// Source text of the rule that matched, if any did.
    pub rule: Option<String>,
    pub nodes: Vec<N>,
}

/// Tries the match rules in priority order and stops at the first one that
/// yields anything. Results of different rules are never mixed.
#[derive(Debug, Clone)]
pub struct NodeSelector {
    rules: Vec<CompiledRule>,
}

impl NodeSelector {
    pub fn new(rules: &[MatchRule]) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyTable("match_rules"));
        }
        let mut compiled = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                Selector::parse(&rule.selector)
                    .map(|selector| CompiledRule {
                        selector,
                        priority: rule.priority,
                    })
                    .map_err(|source| ConfigError::Selector {
                        field: format!("match_rules[{i}]"),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort keeps listed order among equal priorities.
        compiled.sort_by_key(|rule| rule.priority);
        Ok(Self { rules: compiled })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn select<N: TreeNode>(&self, root: &N, observer: &dyn ScanObserver) -> DirectMatch<N> {
        for rule in &self.rules {
            match root.select_all(&rule.selector) {
                Ok(nodes) if !nodes.is_empty() => {
                    observer.rule_matched(rule.selector.as_str(), nodes.len());
                    return DirectMatch {
                        rule: Some(rule.selector.as_str().to_string()),
                        nodes,
                    };
                }
                Ok(_) => {}
                Err(e) => observer.probe_failed(rule.selector.as_str(), &e),
            }
        }
        observer.selectors_exhausted();
        DirectMatch {
            rule: None,
            nodes: Vec::new(),
        }
    }
}
