//! Per-ecosystem route-rule tables.
//!
//! Each module declares the routing idioms of one language family as
//! `RouteRule` data. The tables are aggregated here and compiled once by
//! `RuleSet::build`.

pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust_web;

use super::rules::{ControllerBinding, RouteRule};

/// Every built-in rule, in stable table order.
pub fn all_rules() -> Vec<RouteRule> {
    let mut rules = Vec::new();
    rules.extend(python::rules());
    rules.extend(javascript::rules());
    rules.extend(java::rules());
    rules.extend(csharp::rules());
    rules.extend(ruby::rules());
    rules.extend(php::rules());
    rules.extend(go::rules());
    rules.extend(rust_web::rules());
    rules
}

pub fn controller_bindings() -> Vec<ControllerBinding> {
    csharp::bindings()
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_cover_every_ecosystem() {
        let ecosystems: HashSet<_> = all_rules().iter().map(|r| r.ecosystem).collect();
        assert_eq!(ecosystems.len(), 8);
    }

    #[test]
    fn test_rule_patterns_are_unique() {
        let rules = all_rules();
        let patterns: HashSet<_> = rules.iter().map(|r| r.pattern).collect();
        assert_eq!(patterns.len(), rules.len());
    }
}
