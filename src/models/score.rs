//! Clinical score battery definitions
//!
//! Every score of the battery is reduced the same way; only the source
//! table, the column and the validity rule differ.

use std::fmt;

/// Rule deciding which observations take part in the reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidityRule {
    /// Drop negative values (negative numbers are missing-data codes)
    #[default]
    NonNegative,
    /// Keep every non-null value
    Any,
    /// Replace negative values by zero
    ClampNegative,
}

impl ValidityRule {
    /// Apply the rule to one non-null observation
    #[must_use]
    pub fn apply(self, value: f64) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        match self {
            Self::NonNegative => (value >= 0.0).then_some(value),
            Self::Any => Some(value),
            Self::ClampNegative => Some(value.max(0.0)),
        }
    }
}

/// Clinical score tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreTableId {
    /// Mini-mental state exam
    Mmse,
    /// Clinical dementia rating
    Cdr,
    /// Geriatric depression scale
    Gdscale,
    /// Functional activities questionnaire
    Faq,
    /// Neuropsychiatric inventory questionnaire (`NPI` in the DoD sub-study)
    Npiq,
    /// ADAS-Cog, ADNI1
    Adas1,
    /// ADAS-Cog, ADNI-GO/2 layout (also the DoD `ADAS` table)
    Adas2,
    /// Neuropsychological battery
    Neurobat,
    /// Composite neuropsychological summary scores
    Nss,
    /// Demographics, read as a score table for the DoD age column
    Demographics,
    /// Current CAPS (PTSD) scores, DoD sub-study
    CapsCurrent,
    /// Lifetime CAPS (PTSD) scores, DoD sub-study
    CapsLifetime,
}

impl ScoreTableId {
    /// Tables of the main study battery
    pub const BATTERY: [Self; 9] = [
        Self::Mmse,
        Self::Cdr,
        Self::Gdscale,
        Self::Faq,
        Self::Npiq,
        Self::Adas1,
        Self::Adas2,
        Self::Neurobat,
        Self::Nss,
    ];
}

/// A value column in a score table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreColumn {
    /// Table holding the column
    pub table: ScoreTableId,
    /// Column name
    pub column: &'static str,
}

impl ScoreColumn {
    /// Create a column reference
    #[must_use]
    pub const fn new(table: ScoreTableId, column: &'static str) -> Self {
        Self { table, column }
    }
}

/// Where a score is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSource {
    /// Column consulted first
    pub primary: ScoreColumn,
    /// Column consulted when the primary has no value for the subject
    pub fallback: Option<ScoreColumn>,
}

/// Scores of the clinical battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreKind {
    /// MMSE total
    Mmse,
    /// CDR global
    Cdr,
    /// GDS total
    Gdscale,
    /// FAQ total
    Faq,
    /// NPI-Q total
    Npiq,
    /// ADAS-Cog 11-item total
    Adas11,
    /// ADAS-Cog 13-item total
    Adas13,
    /// Logical memory, delayed recall
    Ldel,
    /// Logical memory, immediate recall
    Limm,
    /// Composite memory score
    NssMem,
    /// Composite executive function score
    NssEf,
}

impl ScoreKind {
    /// The full battery, in profile order
    pub const ALL: [Self; 11] = [
        Self::Mmse,
        Self::Cdr,
        Self::Gdscale,
        Self::Faq,
        Self::Npiq,
        Self::Adas11,
        Self::Adas13,
        Self::Ldel,
        Self::Limm,
        Self::NssMem,
        Self::NssEf,
    ];

    /// Source column(s) of the score
    #[must_use]
    pub const fn source(self) -> ScoreSource {
        use ScoreTableId as T;
        let (primary, fallback) = match self {
            Self::Mmse => (ScoreColumn::new(T::Mmse, "MMSCORE"), None),
            Self::Cdr => (ScoreColumn::new(T::Cdr, "CDGLOBAL"), None),
            Self::Gdscale => (ScoreColumn::new(T::Gdscale, "GDTOTAL"), None),
            Self::Faq => (ScoreColumn::new(T::Faq, "FAQTOTAL"), None),
            Self::Npiq => (ScoreColumn::new(T::Npiq, "NPISCORE"), None),
            Self::Adas11 => (
                ScoreColumn::new(T::Adas1, "TOTAL11"),
                Some(ScoreColumn::new(T::Adas2, "TOTSCORE")),
            ),
            Self::Adas13 => (
                ScoreColumn::new(T::Adas1, "TOTALMOD"),
                Some(ScoreColumn::new(T::Adas2, "TOTAL13")),
            ),
            Self::Ldel => (ScoreColumn::new(T::Neurobat, "LDELTOTAL"), None),
            Self::Limm => (ScoreColumn::new(T::Neurobat, "LIMMTOTAL"), None),
            Self::NssMem => (ScoreColumn::new(T::Nss, "ADNI_MEM"), None),
            Self::NssEf => (ScoreColumn::new(T::Nss, "ADNI_EF"), None),
        };
        ScoreSource { primary, fallback }
    }

    /// Validity rule of the score
    ///
    /// Composite scores are z-scores and MMSE has no negative missing codes,
    /// so both keep every non-null value.
    #[must_use]
    pub const fn validity(self) -> ValidityRule {
        match self {
            Self::Mmse | Self::NssMem | Self::NssEf => ValidityRule::Any,
            _ => ValidityRule::NonNegative,
        }
    }

    /// Short field name of the score
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mmse => "mmse",
            Self::Cdr => "cdr",
            Self::Gdscale => "gdscale",
            Self::Faq => "faq",
            Self::Npiq => "npiq",
            Self::Adas11 => "adas11",
            Self::Adas13 => "adas13",
            Self::Ldel => "ldel",
            Self::Limm => "limm",
            Self::NssMem => "nss_mem",
            Self::NssEf => "nss_ef",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scores of the DoD sub-study battery
///
/// DoD tables are keyed by screening number. Every score clamps negative
/// values to zero before taking the median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DodScoreKind {
    /// MMSE total
    Mmse,
    /// CDR global
    Cdr,
    /// GDS total
    Gdscale,
    /// NPI total
    Npi,
    /// FAQ total
    Faq,
    /// ADAS-Cog 11-item total
    Adas11,
    /// ADAS-Cog 13-item total
    Adas13,
    /// Logical memory, delayed recall
    Ldel,
    /// Logical memory, immediate recall
    Limm,
    /// Age at screening
    Age,
}

impl DodScoreKind {
    /// The full battery, in profile order
    pub const ALL: [Self; 10] = [
        Self::Mmse,
        Self::Cdr,
        Self::Gdscale,
        Self::Npi,
        Self::Faq,
        Self::Adas11,
        Self::Adas13,
        Self::Ldel,
        Self::Limm,
        Self::Age,
    ];

    /// Tables read by the battery
    pub const TABLES: [ScoreTableId; 8] = [
        ScoreTableId::Mmse,
        ScoreTableId::Cdr,
        ScoreTableId::Gdscale,
        ScoreTableId::Npiq,
        ScoreTableId::Faq,
        ScoreTableId::Adas2,
        ScoreTableId::Neurobat,
        ScoreTableId::Demographics,
    ];

    /// Source column of the score
    #[must_use]
    pub const fn column(self) -> ScoreColumn {
        use ScoreTableId as T;
        match self {
            Self::Mmse => ScoreColumn::new(T::Mmse, "MMSCORE"),
            Self::Cdr => ScoreColumn::new(T::Cdr, "CDGLOBAL"),
            Self::Gdscale => ScoreColumn::new(T::Gdscale, "GDTOTAL"),
            Self::Npi => ScoreColumn::new(T::Npiq, "NPITOTAL"),
            Self::Faq => ScoreColumn::new(T::Faq, "FAQTOTAL"),
            Self::Adas11 => ScoreColumn::new(T::Adas2, "TOTSCORE"),
            Self::Adas13 => ScoreColumn::new(T::Adas2, "TOTAL13"),
            Self::Ldel => ScoreColumn::new(T::Neurobat, "LDELTOTAL"),
            Self::Limm => ScoreColumn::new(T::Neurobat, "LIMMTOTAL"),
            Self::Age => ScoreColumn::new(T::Demographics, "PTAGE"),
        }
    }

    /// Validity rule of the score
    #[must_use]
    pub const fn validity(self) -> ValidityRule {
        ValidityRule::ClampNegative
    }

    /// Short field name of the score
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mmse => "mmse",
            Self::Cdr => "cdr",
            Self::Gdscale => "gdscale",
            Self::Npi => "npiq",
            Self::Faq => "faq",
            Self::Adas11 => "adas11",
            Self::Adas13 => "adas13",
            Self::Ldel => "ldel",
            Self::Limm => "limm",
            Self::Age => "age",
        }
    }

    /// Value columns the battery reads from a table
    #[must_use]
    pub fn columns_of(table: ScoreTableId) -> Vec<&'static str> {
        Self::ALL
            .iter()
            .map(|kind| kind.column())
            .filter(|column| column.table == table)
            .map(|column| column.column)
            .collect()
    }
}

impl fmt::Display for DodScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
