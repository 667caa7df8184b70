//! Per-category extension rules.
//!
//! PCF and SHP/IKP repositories share the core catalog. Each category may
//! additionally carry its own rules here; both sets are currently empty.
//! Extension findings are appended after the core findings for a file and
//! never change how the core catalog is evaluated.

use crate::repo::classify::Category;
use crate::rules::catalog::RuleDef;

static PCF_RULES: [RuleDef; 0] = [];
static SHP_IKP_RULES: [RuleDef; 0] = [];

pub fn extension_rules(category: Category) -> &'static [RuleDef] {
    match category {
        Category::Pcf => &PCF_RULES,
        Category::ShpIkp => &SHP_IKP_RULES,
        Category::None => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_category_carries_extensions_yet() {
        for category in [Category::Pcf, Category::ShpIkp, Category::None] {
            assert!(extension_rules(category).is_empty());
        }
    }
}
