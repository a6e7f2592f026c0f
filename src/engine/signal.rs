//! Performance signal classification

use serde::Serialize;

const POSITIVE_COMPLETION_RATE: f64 = 50.0;
const POSITIVE_SHARE_RATE: f64 = 3.0;
const POSITIVE_FOLLOWER_CONVERSION: f64 = 0.5;
const NEGATIVE_COMPLETION_RATE: f64 = 20.0;
const NEGATIVE_ENGAGEMENT_RATE: f64 = 1.0;

/// Coarse classification of a checkpoint's derived metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Positive,
    Negative,
    Neutral,
}

/// Classifier input; every rate is a 0-100 percentage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalInputs {
    pub completion_rate: Option<f64>,
    pub share_rate: Option<f64>,
    pub follower_conversion: Option<f64>,
    pub engagement_rate: Option<f64>,
}

fn above(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|value| value > threshold)
}

fn below(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|value| value < threshold)
}

/// Classify a metrics bundle. Positive rules are checked first and win.
pub fn classify(inputs: &SignalInputs) -> Signal {
    if above(inputs.completion_rate, POSITIVE_COMPLETION_RATE)
        || above(inputs.share_rate, POSITIVE_SHARE_RATE)
        || above(inputs.follower_conversion, POSITIVE_FOLLOWER_CONVERSION)
    {
        return Signal::Positive;
    }

    if below(inputs.completion_rate, NEGATIVE_COMPLETION_RATE)
        || below(inputs.engagement_rate, NEGATIVE_ENGAGEMENT_RATE)
    {
        return Signal::Negative;
    }

    Signal::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_completion_is_positive() {
        let inputs = SignalInputs {
            completion_rate: Some(60.0),
            ..Default::default()
        };
        assert_eq!(classify(&inputs), Signal::Positive);
    }

    #[test]
    fn low_completion_and_engagement_is_negative() {
        let inputs = SignalInputs {
            completion_rate: Some(15.0),
            engagement_rate: Some(0.5),
            ..Default::default()
        };
        assert_eq!(classify(&inputs), Signal::Negative);
    }

    #[test]
    fn all_missing_is_neutral() {
        assert_eq!(classify(&SignalInputs::default()), Signal::Neutral);
    }

    #[test]
    fn boundary_values_are_neutral() {
        let cases = [
            SignalInputs {
                completion_rate: Some(50.0),
                ..Default::default()
            },
            SignalInputs {
                completion_rate: Some(20.0),
                ..Default::default()
            },
            SignalInputs {
                share_rate: Some(3.0),
                ..Default::default()
            },
            SignalInputs {
                follower_conversion: Some(0.5),
                ..Default::default()
            },
            SignalInputs {
                engagement_rate: Some(1.0),
                ..Default::default()
            },
        ];

        for inputs in cases {
            assert_eq!(classify(&inputs), Signal::Neutral, "{inputs:?}");
        }
    }

    #[test]
    fn positive_dominates_negative() {
        let inputs = SignalInputs {
            completion_rate: Some(10.0),
            share_rate: Some(4.0),
            follower_conversion: None,
            engagement_rate: Some(0.1),
        };
        assert_eq!(classify(&inputs), Signal::Positive);

        let inputs = SignalInputs {
            follower_conversion: Some(0.6),
            engagement_rate: Some(0.2),
            ..Default::default()
        };
        assert_eq!(classify(&inputs), Signal::Positive);
    }
}
