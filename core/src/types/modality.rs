use crate::resolver::{
    CtResolver, OtherResolver, ReferenceResolver, RtDoseResolver, RtImageResolver, RtPlanResolver,
    RtStructResolver,
};
use std::fmt;

/// Series content type
///
/// Only the modalities that take part in RT linking are distinguished;
/// everything else collapses into [`Modality::Other`] and keeps its raw
/// code on the series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub enum Modality {
    #[default]
    Other,
    Ct,
    RtStruct,
    RtPlan,
    RtImage,
    RtDose,
}

impl Modality {
    /// Display grouping used by the flat tree
    pub const FLAT_ORDER: [Modality; 6] = [
        Modality::Other,
        Modality::Ct,
        Modality::RtStruct,
        Modality::RtPlan,
        Modality::RtImage,
        Modality::RtDose,
    ];

    /// Order in which cross-modality links are resolved (referrer side)
    pub const RESOLUTION_ORDER: [Modality; 4] = [
        Modality::RtImage,
        Modality::RtDose,
        Modality::RtPlan,
        Modality::RtStruct,
    ];

    /// Order in which buckets are normalised; CT must come after every
    /// RT bucket whose parent links it depends on
    pub const SPLIT_ORDER: [Modality; 5] = [
        Modality::RtStruct,
        Modality::RtPlan,
        Modality::RtDose,
        Modality::RtImage,
        Modality::Ct,
    ];

    /// Parses the DICOM Modality (0008,0060) code
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "CT" => Modality::Ct,
            "RTSTRUCT" => Modality::RtStruct,
            "RTPLAN" => Modality::RtPlan,
            "RTDOSE" => Modality::RtDose,
            "RTIMAGE" => Modality::RtImage,
            _ => Modality::Other,
        }
    }

    /// Canonical DICOM code; `OT` for anything unrecognised
    pub fn code(&self) -> &'static str {
        match self {
            Modality::Other => "OT",
            Modality::Ct => "CT",
            Modality::RtStruct => "RTSTRUCT",
            Modality::RtPlan => "RTPLAN",
            Modality::RtImage => "RTIMAGE",
            Modality::RtDose => "RTDOSE",
        }
    }

    /// Whether this is one of the RT object modalities
    pub fn is_rt(&self) -> bool {
        !matches!(self, Modality::Other | Modality::Ct)
    }

    /// Reference handling for this modality
    pub fn resolver(&self) -> &'static dyn ReferenceResolver {
        match self {
            Modality::Other => &OtherResolver,
            Modality::Ct => &CtResolver,
            Modality::RtStruct => &RtStructResolver,
            Modality::RtPlan => &RtPlanResolver,
            Modality::RtImage => &RtImageResolver,
            Modality::RtDose => &RtDoseResolver,
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
