//! Crisis lines and the therapist directory shown on the support page.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CrisisResource {
    pub name: &'static str,
    pub contact: &'static str,
    pub availability: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Therapist {
    pub name: &'static str,
    pub role: &'static str,
    pub experience_years: u8,
    pub specialties: &'static [&'static str],
}

impl Therapist {
    pub fn has_specialty(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.specialties
            .iter()
            .any(|specialty| specialty.eq_ignore_ascii_case(tag))
    }
}

pub const CRISIS_RESOURCES: [CrisisResource; 2] = [
    CrisisResource {
        name: "988 Suicide & Crisis Lifeline",
        contact: "Call or text 988",
        availability: "24/7",
    },
    CrisisResource {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
        availability: "24/7",
    },
];

pub const THERAPISTS: [Therapist; 3] = [
    Therapist {
        name: "Dr. Sarah Mitchell",
        role: "Clinical Psychologist",
        experience_years: 12,
        specialties: &["Anxiety", "Depression"],
    },
    Therapist {
        name: "James Wilson",
        role: "Licensed Counselor",
        experience_years: 8,
        specialties: &["Trauma", "Grief"],
    },
    Therapist {
        name: "Dr. Elena Rossi",
        role: "Cognitive Therapist",
        experience_years: 15,
        specialties: &["CBT", "Work-Life"],
    },
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SupportDirectory {
    pub crisis_resources: Vec<CrisisResource>,
    pub therapists: Vec<Therapist>,
}

/// Crisis lines are always listed; therapists are narrowed to `specialty`
/// when one is given. A blank filter lists everyone.
pub fn get_support_directory(specialty: Option<&str>) -> SupportDirectory {
    let therapists = THERAPISTS
        .iter()
        .filter(|therapist| match specialty.map(str::trim) {
            Some(tag) if !tag.is_empty() => therapist.has_specialty(tag),
            _ => true,
        })
        .cloned()
        .collect();

    SupportDirectory {
        crisis_resources: CRISIS_RESOURCES.to_vec(),
        therapists,
    }
}
