use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = AnalysisError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(AnalysisError::InvalidInput {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Aspect {
    Price => "price",
    Skill => "skill",
    Kindness => "kindness",
    WaitingTime => "waiting_time",
    Facility => "facility",
    Overtreatment => "overtreatment",
});

impl Aspect {
    /// All six aspects, in the canonical reporting order.
    pub const ALL: [Aspect; 6] = [
        Aspect::Price,
        Aspect::Skill,
        Aspect::Kindness,
        Aspect::WaitingTime,
        Aspect::Facility,
        Aspect::Overtreatment,
    ];
}

str_enum!(Treatment {
    Scaling => "scaling",
    Implant => "implant",
    RootCanal => "root_canal",
    Orthodontics => "orthodontics",
    Whitening => "whitening",
    Extraction => "extraction",
    Filling => "filling",
    Crown => "crown",
    Bridge => "bridge",
    Denture => "denture",
    Other => "other",
});

impl Treatment {
    /// Korean display label, as shown to end users.
    pub fn label_ko(&self) -> &'static str {
        match self {
            Self::Scaling => "스케일링",
            Self::Implant => "임플란트",
            Self::RootCanal => "신경치료",
            Self::Orthodontics => "교정",
            Self::Whitening => "미백",
            Self::Extraction => "발치",
            Self::Filling => "충치치료",
            Self::Crown => "크라운",
            Self::Bridge => "브릿지",
            Self::Denture => "틀니",
            Self::Other => "기타",
        }
    }
}

str_enum!(ReviewSource {
    Naver => "naver",
    Google => "google",
    Manual => "manual",
});
