#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Text,
    Varchar {
        length: Option<u32>,
    },
    Char {
        length: Option<u32>,
    },
    Blob,
    Date,
    Time {
        precision: Option<u32>,
        with_timezone: bool,
    },
    Timestamp {
        precision: Option<u32>,
        with_timezone: bool,
    },
    Interval,
    Json,
    Jsonb,
    Uuid,
    Array(Box<DataType>),
    Custom(String),
}
