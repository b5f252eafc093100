use crate::error::DialecticError;
use crate::event::{ErrorInfo, Event};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named canned events that dashboard buttons (and `dialectic run --scenario`)
/// feed through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Security,
    Mvp,
    Performance,
    Error,
    Documentation,
}

impl Scenario {
    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::Security,
            Scenario::Mvp,
            Scenario::Performance,
            Scenario::Error,
            Scenario::Documentation,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Security => "security",
            Scenario::Mvp => "mvp",
            Scenario::Performance => "performance",
            Scenario::Error => "error",
            Scenario::Documentation => "documentation",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Scenario::Security => "Security Focus",
            Scenario::Mvp => "MVP Sprint",
            Scenario::Performance => "Performance Optimization",
            Scenario::Error => "Error Resolution",
            Scenario::Documentation => "Documentation Pass",
        }
    }

    /// A fresh event for this scenario, stamped now.
    pub fn event(self) -> Event {
        let (message, files): (&str, &[&str]) = match self {
            Scenario::Security => (
                "Add JWT authentication with secure token handling",
                &["src/auth/jwt.py", "src/middleware/auth.py"],
            ),
            Scenario::Mvp => (
                "Quick MVP prototype for hackathon demo",
                &["src/prototype/feature.py"],
            ),
            Scenario::Performance => (
                "Optimize API response time with caching",
                &["src/api/optimize.py", "src/cache/redis.py"],
            ),
            Scenario::Error => ("Fix TypeError in user handler", &["src/api/handler.py"]),
            Scenario::Documentation => (
                "Update README with setup guide",
                &["README.md", "docs/setup.md"],
            ),
        };
        let event = Event::new(message, files.iter().map(|f| f.to_string()).collect());
        match self {
            Scenario::Error => event.with_errors(vec![ErrorInfo {
                kind: "TypeError".into(),
                count: 5,
            }]),
            _ => event,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scenario {
    type Err = DialecticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::all()
            .iter()
            .copied()
            .find(|sc| sc.as_str() == s)
            .ok_or_else(|| DialecticError::UnknownScenario(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::types::Category;

    #[test]
    fn parses_names() {
        assert_eq!("mvp".parse::<Scenario>().unwrap(), Scenario::Mvp);
        assert!(matches!(
            "frontend".parse::<Scenario>(),
            Err(DialecticError::UnknownScenario(s)) if s == "frontend"
        ));
    }

    #[test]
    fn each_scenario_lights_its_own_category() {
        let classifier = Classifier::default();
        let expected = [
            (Scenario::Security, Category::Security),
            (Scenario::Mvp, Category::Mvp),
            (Scenario::Performance, Category::Performance),
            (Scenario::Error, Category::Error),
            (Scenario::Documentation, Category::Documentation),
        ];
        for (scenario, category) in expected {
            let flags = classifier.classify(&scenario.event());
            assert_eq!(flags.categories(), vec![category], "{scenario}");
        }
    }
}
