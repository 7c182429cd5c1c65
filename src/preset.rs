/// A pre-authored emergency category used to pre-fill the symptom input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyPreset {
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// Fixed catalog of common emergencies, in display order.
pub fn catalog() -> &'static [EmergencyPreset] {
    &[
        EmergencyPreset {
            label: "Chest Pain",
            description: "Pressure, tightness or pain in the chest",
            icon: "❤",
        },
        EmergencyPreset {
            label: "Difficulty Breathing",
            description: "Shortness of breath or wheezing",
            icon: "🫁",
        },
        EmergencyPreset {
            label: "Severe Bleeding",
            description: "Bleeding that won't stop with pressure",
            icon: "🩸",
        },
        EmergencyPreset {
            label: "Choking",
            description: "Airway blocked by food or an object",
            icon: "⚠",
        },
        EmergencyPreset {
            label: "Burns",
            description: "Heat, chemical or electrical burns",
            icon: "🔥",
        },
        EmergencyPreset {
            label: "Stroke Symptoms",
            description: "Face drooping, arm weakness, slurred speech",
            icon: "🧠",
        },
        EmergencyPreset {
            label: "Allergic Reaction",
            description: "Swelling, hives or trouble swallowing",
            icon: "💊",
        },
        EmergencyPreset {
            label: "Broken Bone",
            description: "Suspected fracture after a fall or impact",
            icon: "🦴",
        },
    ]
}

/// Combine a preset label with whatever the user had already typed.
///
/// The label replaces the input; non-empty prior text is kept below it as
/// additional symptoms.
pub fn apply_label(label: &str, previous: &str) -> String {
    if previous.is_empty() {
        label.to_string()
    } else {
        format!("{}\n\nAdditional symptoms: {}", label, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_label_with_prior_input() {
        assert_eq!(
            apply_label("Chest Pain", "dizzy"),
            "Chest Pain\n\nAdditional symptoms: dizzy"
        );
    }

    #[test]
    fn test_apply_label_with_empty_input() {
        assert_eq!(apply_label("Choking", ""), "Choking");
    }

    #[test]
    fn test_catalog_labels_are_unique() {
        let presets = catalog();
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a.label, b.label);
            }
        }
    }

    #[test]
    fn test_catalog_is_non_empty() {
        assert!(!catalog().is_empty());
        for preset in catalog() {
            assert!(!preset.label.is_empty());
            assert!(!preset.description.is_empty());
        }
    }
}
