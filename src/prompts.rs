//! Categories and the fixed prompt template behind each one.
//!
//! Every category maps to exactly one [`PromptTemplate`] through a static
//! table indexed by the enum, so dispatch never branches on strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    IllnessLookup,
    MedicineLookup,
    IllnessMedicine,
    MentalHealth,
    NaturalRemedy,
    SymptomCheck,
    OpenChat,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::IllnessLookup,
        Category::MedicineLookup,
        Category::IllnessMedicine,
        Category::MentalHealth,
        Category::NaturalRemedy,
        Category::SymptomCheck,
        Category::OpenChat,
    ];

    pub fn slug(self) -> &'static str {
        self.copy().slug
    }

    pub fn title(self) -> &'static str {
        self.copy().title
    }

    pub fn description(self) -> &'static str {
        self.copy().description
    }

    pub fn input_label(self) -> &'static str {
        self.copy().input_label
    }

    pub fn placeholder(self) -> &'static str {
        self.copy().placeholder
    }

    pub fn action_label(self) -> &'static str {
        self.copy().action_label
    }

    /// Only open chat keeps a conversation between submissions.
    pub fn is_conversational(self) -> bool {
        matches!(self, Category::OpenChat)
    }

    pub fn template(self) -> &'static PromptTemplate {
        lookup(self)
    }

    fn copy(self) -> &'static PageCopy {
        &PAGE_COPY[self as usize]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

struct PageCopy {
    slug: &'static str,
    title: &'static str,
    description: &'static str,
    input_label: &'static str,
    placeholder: &'static str,
    action_label: &'static str,
}

// Indexed by `Category as usize`; order must follow the enum.
static PAGE_COPY: [PageCopy; 7] = [
    PageCopy {
        slug: "illness-lookup",
        title: "Diagnose Illness",
        description: "Get symptoms, causes, treatment, diet, and lifestyle guidance.",
        input_label: "Enter illness name:",
        placeholder: "e.g. diabetes, dengue",
        action_label: "Get Info",
    },
    PageCopy {
        slug: "medicine-lookup",
        title: "Medicine Information",
        description: "Get accurate details on usage, dosage, risks, and interactions.",
        input_label: "Enter medicine name:",
        placeholder: "e.g. paracetamol",
        action_label: "Get Info",
    },
    PageCopy {
        slug: "illness-medicine",
        title: "Medicines for an Illness",
        description: "Find medicines commonly used to treat a condition, with dosage and precautions.",
        input_label: "Enter illness name:",
        placeholder: "e.g. migraine, hypertension",
        action_label: "Find Medicines",
    },
    PageCopy {
        slug: "mental-health",
        title: "Psychology & Mental Wellness",
        description: "Get therapeutic strategies, mindfulness techniques, and mental health guidance.",
        input_label: "Enter mental health concern:",
        placeholder: "e.g. anxiety, burnout",
        action_label: "Get Support",
    },
    PageCopy {
        slug: "natural-remedy",
        title: "Homeopathy & Natural Remedies",
        description: "Discover natural and homeopathic cures with lifestyle guidance.",
        input_label: "Enter condition:",
        placeholder: "e.g. headache, joint pain",
        action_label: "Get Remedy",
    },
    PageCopy {
        slug: "symptom-check",
        title: "Symptom Checker",
        description: "Enter multiple symptoms and get a possible diagnosis with suggestions.",
        input_label: "Enter your symptoms:",
        placeholder: "e.g. fever, sore throat, fatigue",
        action_label: "Check Symptoms",
    },
    PageCopy {
        slug: "open-chat",
        title: "Talk to Doctor AI",
        description: "Chat live with a friendly AI doctor. Ask anything about health, symptoms, or general advice.",
        input_label: "Ask your question...",
        placeholder: "Ask your question...",
        action_label: "Send",
    },
];

/// A system role plus an instruction built around the user's input.
#[derive(Debug)]
pub struct PromptTemplate {
    pub system_role: &'static str,
    /// Lead-in sentence; `{input}` is replaced by the user's text.
    /// `None` sends the user's text unchanged.
    lead: Option<&'static str>,
    sections: &'static [&'static str],
}

const INPUT_SLOT: &str = "{input}";

impl PromptTemplate {
    /// Fill the template with `input` and append the numbered section list.
    pub fn render(&self, input: &str) -> String {
        let Some(lead) = self.lead else {
            return input.to_string();
        };

        let mut prompt = lead.replacen(INPUT_SLOT, input, 1);
        for (i, section) in self.sections.iter().enumerate() {
            prompt.push('\n');
            prompt.push_str(&format!("{}. {}", i + 1, section));
        }
        prompt
    }

    pub fn sections(&self) -> &'static [&'static str] {
        self.sections
    }
}

// Indexed by `Category as usize`; order must follow the enum.
static TEMPLATES: [PromptTemplate; 7] = [
    PromptTemplate {
        system_role: "You are a medical expert and certified doctor.",
        lead: Some("Provide professional medical info on \"{input}\" with:"),
        sections: &[
            "Definition & cause",
            "Symptoms",
            "Diagnosis & tests",
            "Medical treatment",
            "Home/natural remedies",
            "Diet & nutrition",
            "Lifestyle changes",
        ],
    },
    PromptTemplate {
        system_role: "You are a professional pharmacist.",
        lead: Some("Provide details for the medicine \"{input}\" including:"),
        sections: &[
            "What it treats",
            "Active ingredients",
            "Dosage instructions",
            "Side effects & interactions",
            "Warnings & contraindications",
            "Overdose and missed dose instructions",
        ],
    },
    PromptTemplate {
        system_role: "You are a medical expert and professional pharmacist.",
        lead: Some("Suggest medicines commonly used to treat \"{input}\" with:"),
        sections: &[
            "Commonly prescribed medicines",
            "Over-the-counter options",
            "Typical dosage guidance",
            "Side effects to watch for",
            "Drug interactions & precautions",
            "When to see a doctor",
        ],
    },
    PromptTemplate {
        system_role: "You are a clinical psychologist and wellness therapist.",
        lead: Some("Explain the mental health topic \"{input}\" with:"),
        sections: &[
            "Psychological background",
            "Warning signs",
            "Coping strategies",
            "Therapy & treatment options",
            "Self-care & daily routines",
            "Mindfulness exercises",
        ],
    },
    PromptTemplate {
        system_role: "You are an Ayurvedic and homeopathy expert.",
        lead: Some("Suggest homeopathy and natural remedies for \"{input}\" with:"),
        sections: &[
            "Homeopathic medicine (with potencies)",
            "Home remedies using ingredients",
            "Ayurvedic or holistic alternatives",
            "Lifestyle and prevention tips",
            "What to avoid during condition",
        ],
    },
    PromptTemplate {
        system_role: "You are a medical diagnosis expert.",
        lead: Some(
            "You are an experienced diagnostic AI. A user describes the following symptoms: \"{input}\". Please provide:",
        ),
        sections: &[
            "Most likely illness or condition",
            "Possible causes",
            "Recommended diagnostic tests (if any)",
            "Immediate care suggestions",
            "When to consult a doctor",
        ],
    },
    PromptTemplate {
        system_role: "You are a smart, experienced doctor giving accurate and kind advice.",
        lead: None,
        sections: &[],
    },
];

/// Template for `category`. Total over the enum.
pub fn lookup(category: Category) -> &'static PromptTemplate {
    &TEMPLATES[category as usize]
}
