//! Fixed taxonomies: schools of jurisprudence, topic domains, and the
//! per-school canonical author allowlists
//!
//! Everything here is server-side and closed. Request values that do not
//! parse into one of these enums are dropped at the boundary, which is what
//! keeps user input out of the query text entirely.

use serde::{Deserialize, Serialize};

/// School of jurisprudence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tradition {
    Hanafi,
    Maliki,
    Shafii,
    Hanbali,
    Salafi,
}

impl Tradition {
    /// Lenient parse; unknown values yield None and are dropped silently
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hanafi" => Some(Tradition::Hanafi),
            "maliki" => Some(Tradition::Maliki),
            "shafii" => Some(Tradition::Shafii),
            "hanbali" => Some(Tradition::Hanbali),
            "salafi" => Some(Tradition::Salafi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tradition::Hanafi => "hanafi",
            Tradition::Maliki => "maliki",
            Tradition::Shafii => "shafii",
            Tradition::Hanbali => "hanbali",
            Tradition::Salafi => "salafi",
        }
    }

    /// Human-readable label used in responses and grounding context
    pub fn label(&self) -> &'static str {
        match self {
            Tradition::Hanafi => "Hanafi (إمام أبو حنيفة)",
            Tradition::Maliki => "Maliki (إمام مالك بن أنس)",
            Tradition::Shafii => "Shafi'i (إمام الشافعي)",
            Tradition::Hanbali => "Hanbali classique (إمام أحمد بن حنبل)",
            Tradition::Salafi => "Courant Salafi contemporain",
        }
    }

    /// Canonical reference authors for this school.
    ///
    /// Matching any of these names partitions a candidate ahead of every
    /// non-canonical one; this encodes "prefer the recognized reference text
    /// of a school over tangential opinions". Ibn Taymiyyah practices ijtihad
    /// and is deliberately not listed for established Hanbali fiqh.
    pub fn canonical_scholars(&self) -> &'static [&'static str] {
        match self {
            Tradition::Hanbali => &["البهوتي", "ابن قدامة"],
            Tradition::Maliki => &["الخرشي", "الدردير", "الدسوقي", "الحطاب"],
            Tradition::Hanafi => &["ابن عابدين"],
            Tradition::Shafii => &["الرملي", "ابن حجر الهيثمي"],
            Tradition::Salafi => &["ابن باز", "ابن عثيمين", "اللجنة الدائمة"],
        }
    }

    /// Display label for a raw tradition string from the database; falls back
    /// to the raw value for anything outside the taxonomy
    pub fn label_for(raw: &str) -> String {
        match Tradition::parse(raw) {
            Some(t) => t.label().to_string(),
            None if raw == "general" => "Toutes écoles".to_string(),
            None => raw.to_string(),
        }
    }
}

/// Topic tag taxonomy for passages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    PurificationTaharah,
    PriereSalat,
    Zakat,
    JeuneSiyam,
    HajjUmrah,
    MariageNikah,
    DivorceTalaq,
    HeritageMawaris,
    CommerceMuamalat,
    FinanceIslamique,
    AlimentationAtimah,
    HabillementLibs,
    RelationsSociales,
    AqidaCroyance,
    CoranLecture,
    InvocationsAdkar,
    MedicalSante,
    TravailEmploi,
    TechnologieModerne,
    JihadDefensif,
    Divers,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::PurificationTaharah => "purification-taharah",
            Domain::PriereSalat => "priere-salat",
            Domain::Zakat => "zakat",
            Domain::JeuneSiyam => "jeune-siyam",
            Domain::HajjUmrah => "hajj-umrah",
            Domain::MariageNikah => "mariage-nikah",
            Domain::DivorceTalaq => "divorce-talaq",
            Domain::HeritageMawaris => "heritage-mawaris",
            Domain::CommerceMuamalat => "commerce-muamalat",
            Domain::FinanceIslamique => "finance-islamique",
            Domain::AlimentationAtimah => "alimentation-atimah",
            Domain::HabillementLibs => "habillement-libs",
            Domain::RelationsSociales => "relations-sociales",
            Domain::AqidaCroyance => "aqida-croyance",
            Domain::CoranLecture => "coran-lecture",
            Domain::InvocationsAdkar => "invocations-adkar",
            Domain::MedicalSante => "medical-sante",
            Domain::TravailEmploi => "travail-emploi",
            Domain::TechnologieModerne => "technologie-moderne",
            Domain::JihadDefensif => "jihad-defensif",
            Domain::Divers => "divers",
        }
    }

    /// Lenient parse; unknown values yield None and are dropped silently
    pub fn parse(value: &str) -> Option<Self> {
        Domain::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == value.trim().to_lowercase())
    }

    pub const ALL: [Domain; 21] = [
        Domain::PurificationTaharah,
        Domain::PriereSalat,
        Domain::Zakat,
        Domain::JeuneSiyam,
        Domain::HajjUmrah,
        Domain::MariageNikah,
        Domain::DivorceTalaq,
        Domain::HeritageMawaris,
        Domain::CommerceMuamalat,
        Domain::FinanceIslamique,
        Domain::AlimentationAtimah,
        Domain::HabillementLibs,
        Domain::RelationsSociales,
        Domain::AqidaCroyance,
        Domain::CoranLecture,
        Domain::InvocationsAdkar,
        Domain::MedicalSante,
        Domain::TravailEmploi,
        Domain::TechnologieModerne,
        Domain::JihadDefensif,
        Domain::Divers,
    ];
}
