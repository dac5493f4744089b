use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Expected state of one neighbour in a [`CellRule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuleCell {
    #[default]
    DontCare,
    Unoccupied,
    Occupied,
}

/// 3x3 neighbourhood pattern indexed `[y * 3 + x]`, bottom row first.
/// The centre entry is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellRule {
    pub pattern: [RuleCell; 9],
}

impl CellRule {
    pub fn get(&self, x: usize, y: usize) -> RuleCell {
        self.pattern[y * 3 + x]
    }

    pub fn set(&mut self, x: usize, y: usize, state: RuleCell) {
        self.pattern[y * 3 + x] = state;
    }

    fn matches(&self, cell: glam::IVec2, cells: &CellSet) -> bool {
        for y in 0..3 {
            for x in 0..3 {
                if x == 1 && y == 1 {
                    continue;
                }
                let occupied = cells.contains(cell + glam::IVec2::new(x as i32 - 1, y as i32 - 1));
                match self.get(x, y) {
                    RuleCell::DontCare => {}
                    RuleCell::Occupied if !occupied => return false,
                    RuleCell::Unoccupied if occupied => return false,
                    _ => {}
                }
            }
        }
        true
    }
}

/// Keeps cells matching any of the rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectByRule {
    pub rules: Vec<CellRule>,
}

impl BlueprintModifier for SelectByRule {
    fn execute(&self, cells: &CellSet, _ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        Ok(cells
            .iter()
            .filter(|c| self.rules.iter().any(|r| r.matches(*c, cells)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LayerRng;
    use crate::blueprint::modifiers::test_util::rect;

    #[test]
    fn test_rule_selects_left_column() {
        let mut rule = CellRule::default();
        rule.set(0, 1, RuleCell::Unoccupied);
        rule.set(2, 1, RuleCell::Occupied);
        let step = SelectByRule { rules: vec![rule] };
        let mut ctx = ModifierContext::new(10, 10, LayerRng::new(1), &[]);
        let out = step.execute(&rect(0, 0, 3, 3), &mut ctx).unwrap();
        assert_eq!(out, rect(0, 0, 1, 3));
    }

    #[test]
    fn test_no_rules_selects_nothing() {
        let mut ctx = ModifierContext::new(10, 10, LayerRng::new(1), &[]);
        let out = SelectByRule::default().execute(&rect(0, 0, 3, 3), &mut ctx).unwrap();
        assert!(out.is_empty());
    }
}
