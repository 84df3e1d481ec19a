use std::str::FromStr;

/// Damage categories the collector tags each hit with (codes 0 to 13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DamageType {
    Talent,
    Basic,
    Skill,
    Ultimate,
    Qte,
    Dot,
    Pursued,
    Technique,
    MazeNormal,
    FollowUp,
    ElementDamage,
    Level,
    Summon,
    TrueDamage,
}

/// Label language for damage and skill types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ja" | "jp" => Ok(Self::Ja),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

impl DamageType {
    pub const ALL: [DamageType; 14] = [
        Self::Talent,
        Self::Basic,
        Self::Skill,
        Self::Ultimate,
        Self::Qte,
        Self::Dot,
        Self::Pursued,
        Self::Technique,
        Self::MazeNormal,
        Self::FollowUp,
        Self::ElementDamage,
        Self::Level,
        Self::Summon,
        Self::TrueDamage,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => match self {
                Self::Talent => "Talent",
                Self::Basic => "Basic",
                Self::Skill => "Skill",
                Self::Ultimate => "Ultimate",
                Self::Qte => "QTE",
                Self::Dot => "DOT",
                Self::Pursued => "Pursued",
                Self::Technique => "Technique",
                Self::MazeNormal => "MazeNormal",
                Self::FollowUp => "Follow-up",
                Self::ElementDamage => "ElementDamage",
                Self::Level => "Level",
                Self::Summon => "Summon",
                Self::TrueDamage => "TrueDamage",
            },
            Locale::Ja => match self {
                Self::Talent => "天賦",
                Self::Basic => "通常攻撃",
                Self::Skill => "スキル",
                Self::Ultimate => "必殺技",
                Self::Qte => "QTE",
                Self::Dot => "継続ダメージ",
                Self::Pursued => "追加ダメージ",
                Self::Technique => "秘技",
                Self::MazeNormal => "通常迷宮",
                Self::FollowUp => "追撃ダメージ",
                Self::ElementDamage => "撃破・超撃破ダメージ",
                Self::Level => "レベル",
                Self::Summon => "召喚",
                Self::TrueDamage => "確定ダメージ",
            },
        }
    }

    /// Wording used when the code names the kind of skill cast rather than a hit.
    pub const fn attack_label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => match self {
                Self::Basic => "Basic Attack",
                Self::MazeNormal => "Maze Normal",
                Self::ElementDamage => "Elemental Damage",
                Self::TrueDamage => "True Damage",
                other => other.label(locale),
            },
            Locale::Ja => match self {
                Self::Pursued => "追撃",
                Self::MazeNormal => "秘技通常",
                Self::FollowUp => "追撃攻撃",
                Self::ElementDamage => "属性ダメージ",
                other => other.label(locale),
            },
        }
    }
}

/// Label for a raw type code; codes outside the enum render as `DamageType<N>`.
pub fn damage_type_label(code: u32, locale: Locale) -> String {
    match DamageType::from_code(code) {
        Some(kind) => kind.label(locale).to_string(),
        None => match locale {
            Locale::En => format!("DamageType{code}"),
            Locale::Ja => format!("ダメージタイプ{code}"),
        },
    }
}

/// Skill type label for a raw code; unknown codes render as `Unknown(N)`.
pub fn attack_type_label(code: u32, locale: Locale) -> String {
    match DamageType::from_code(code) {
        Some(kind) => kind.attack_label(locale).to_string(),
        None => format!("Unknown({code})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_the_enum() {
        for (index, kind) in DamageType::ALL.iter().enumerate() {
            assert_eq!(kind.code() as usize, index);
            assert_eq!(DamageType::from_code(kind.code()), Some(*kind));
        }
        assert_eq!(DamageType::from_code(14), None);
    }

    #[test]
    fn unknown_codes_get_synthetic_labels() {
        assert_eq!(damage_type_label(9, Locale::En), "Follow-up");
        assert_eq!(damage_type_label(42, Locale::En), "DamageType42");
        assert_eq!(damage_type_label(42, Locale::Ja), "ダメージタイプ42");
    }

    #[test]
    fn attack_labels_differ_from_hit_labels() {
        assert_eq!(attack_type_label(1, Locale::En), "Basic Attack");
        assert_eq!(attack_type_label(10, Locale::En), "Elemental Damage");
        assert_eq!(attack_type_label(2, Locale::En), "Skill");
        assert_eq!(attack_type_label(9, Locale::Ja), "追撃攻撃");
        assert_eq!(attack_type_label(1, Locale::Ja), "通常攻撃");
        assert_eq!(attack_type_label(42, Locale::En), "Unknown(42)");
        assert_eq!(attack_type_label(42, Locale::Ja), "Unknown(42)");
    }

    #[test]
    fn locale_parses_case_insensitively() {
        assert_eq!("JA".parse::<Locale>(), Ok(Locale::Ja));
        assert_eq!(" en ".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }
}
