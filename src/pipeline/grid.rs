//! Sampling-parameter grid.
//!
//! The grid is the cartesian product of four axes, enumerated with
//! temperature outermost and frequency penalty innermost.

use crate::models::{ConfigError, ParameterTuple};
use serde::{Deserialize, Serialize};

/// Axes of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub temperatures: Vec<f64>,
    pub max_tokens: Vec<u32>,
    pub presence_penalties: Vec<f64>,
    pub frequency_penalties: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            temperatures: vec![0.0, 0.7, 1.2],
            max_tokens: vec![50, 150, 300],
            presence_penalties: vec![0.0, 1.5],
            frequency_penalties: vec![0.0, 1.5],
        }
    }
}

impl ParameterGrid {
    /// Number of combinations the grid produces.
    pub fn len(&self) -> usize {
        self.temperatures.len()
            * self.max_tokens.len()
            * self.presence_penalties.len()
            * self.frequency_penalties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All combinations in nested order.
    pub fn enumerate(&self) -> Vec<ParameterTuple> {
        let mut tuples = Vec::with_capacity(self.len());

        for &temperature in &self.temperatures {
            for &max_tokens in &self.max_tokens {
                for &presence_penalty in &self.presence_penalties {
                    for &frequency_penalty in &self.frequency_penalties {
                        tuples.push(ParameterTuple {
                            temperature,
                            max_tokens,
                            presence_penalty,
                            frequency_penalty,
                        });
                    }
                }
            }
        }

        tuples
    }

    /// Reject axis values the chat completions API would refuse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self
            .temperatures
            .iter()
            .find(|t| !(0.0..=2.0).contains(*t))
        {
            return Err(ConfigError::InvalidGrid(format!(
                "temperature {t} outside [0, 2]"
            )));
        }

        if self.max_tokens.contains(&0) {
            return Err(ConfigError::InvalidGrid(
                "max_tokens must be positive".to_string(),
            ));
        }

        let penalties = self
            .presence_penalties
            .iter()
            .map(|p| ("presence_penalty", p))
            .chain(
                self.frequency_penalties
                    .iter()
                    .map(|p| ("frequency_penalty", p)),
            );
        for (name, p) in penalties {
            if !(-2.0..=2.0).contains(p) {
                return Err(ConfigError::InvalidGrid(format!(
                    "{name} {p} outside [-2, 2]"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_has_36_cells() {
        let grid = ParameterGrid::default();
        assert_eq!(grid.len(), 36);
        assert_eq!(grid.enumerate().len(), 36);
    }

    #[test]
    fn test_enumeration_order() {
        let tuples = ParameterGrid::default().enumerate();

        assert_eq!(
            tuples[0],
            ParameterTuple {
                temperature: 0.0,
                max_tokens: 50,
                presence_penalty: 0.0,
                frequency_penalty: 0.0,
            }
        );
        // Innermost axis changes first
        assert_eq!(tuples[1].frequency_penalty, 1.5);
        assert_eq!(tuples[1].presence_penalty, 0.0);
        assert_eq!(tuples[2].presence_penalty, 1.5);
        assert_eq!(tuples[4].max_tokens, 150);
        // Outermost axis changes every 12 cells
        assert_eq!(tuples[11].temperature, 0.0);
        assert_eq!(tuples[12].temperature, 0.7);
        assert_eq!(
            tuples[35],
            ParameterTuple {
                temperature: 1.2,
                max_tokens: 300,
                presence_penalty: 1.5,
                frequency_penalty: 1.5,
            }
        );
    }

    #[test]
    fn test_no_duplicate_cells() {
        let tuples = ParameterGrid::default().enumerate();
        for (i, a) in tuples.iter().enumerate() {
            for b in &tuples[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_empty_axis_gives_empty_grid() {
        let grid = ParameterGrid {
            max_tokens: vec![],
            ..Default::default()
        };
        assert!(grid.is_empty());
        assert!(grid.enumerate().is_empty());
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let grid = ParameterGrid {
            temperatures: vec![0.5, 2.5],
            ..Default::default()
        };
        assert!(matches!(grid.validate(), Err(ConfigError::InvalidGrid(_))));

        let grid = ParameterGrid {
            max_tokens: vec![0],
            ..Default::default()
        };
        assert!(grid.validate().is_err());

        let grid = ParameterGrid {
            frequency_penalties: vec![-2.5],
            ..Default::default()
        };
        assert!(grid.validate().is_err());

        assert!(ParameterGrid::default().validate().is_ok());
    }
}
