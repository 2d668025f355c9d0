//! Built-in seed catalog used when no catalog file is configured.

use sciconnect_core::types::{Cause, Expert, PersonalityType};

fn expert(
    id: &str,
    name: &str,
    field: &str,
    personality: PersonalityType,
    bio: &str,
    avatar: &str,
    causes: &[&str],
) -> Expert {
    Expert {
        id: id.to_string(),
        name: name.to_string(),
        field: field.to_string(),
        personality,
        bio: bio.to_string(),
        avatar: avatar.to_string(),
        causes: causes.iter().map(|c| c.to_string()).collect(),
    }
}

fn cause(id: &str, name: &str, description: &str, impact: &str) -> Cause {
    Cause {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        impact: impact.to_string(),
    }
}

pub fn experts() -> Vec<Expert> {
    vec![
        expert(
            "s1",
            "Dr. Amina Patel",
            "Astrophysics",
            PersonalityType::Intj,
            "Researches exoplanet atmospheres and biosignatures.",
            "https://images.unsplash.com/photo-1527980965255-d3b416303d12?q=80&w=300&auto=format&fit=crop",
            &["Girls in STEM", "Space Education"],
        ),
        expert(
            "s2",
            "Prof. Luca Romano",
            "Neuroscience",
            PersonalityType::Enfp,
            "Studies memory consolidation and learning.",
            "https://images.unsplash.com/photo-1544005313-94ddf0286df2?q=80&w=300&auto=format&fit=crop",
            &["Neurodiversity", "Open Science"],
        ),
        expert(
            "s3",
            "Dr. Mei Lin",
            "Climate Science",
            PersonalityType::Infj,
            "Models regional climate adaptation strategies.",
            "https://images.unsplash.com/photo-1556157382-97eda2d62296?q=80&w=300&auto=format&fit=crop",
            &["Reforestation", "Clean Water"],
        ),
        expert(
            "s4",
            "Dr. Kwame Mensah",
            "Biotech",
            PersonalityType::Entp,
            "Develops low-cost point-of-care diagnostics.",
            "https://images.unsplash.com/photo-1506794778202-cad84cf45f1d?q=80&w=300&auto=format&fit=crop",
            &["Global Health", "Lab Access"],
        ),
    ]
}

pub fn causes() -> Vec<Cause> {
    vec![
        cause("c1", "Girls in STEM", "Scholarships and mentorship for girls in science.", "$25 buys 1hr mentorship"),
        cause("c2", "Space Education", "Hands-on astronomy kits for classrooms.", "$50 funds a star party"),
        cause("c3", "Neurodiversity", "Support inclusive learning tools.", "$20 funds accessibility tools"),
        cause("c4", "Open Science", "Grants to open-source research software.", "$30 sponsors compute time"),
        cause("c5", "Reforestation", "Tree-planting in climate-vulnerable regions.", "$10 plants 5 trees"),
        cause("c6", "Clean Water", "Affordable water purification kits.", "$40 funds 1 family/month"),
        cause("c7", "Global Health", "Diagnostics for remote clinics.", "$35 equips 1 kit"),
        cause("c8", "Lab Access", "Microgrants for community labs.", "$15 buys lab consumables"),
    ]
}
