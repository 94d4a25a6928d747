/// `Instruction` is a single storage command executed by the [`super::Runner`]
pub enum Instruction {
    SaveCf { key: String, value: Vec<u8> },
    GetCf { key: String },
}

#[derive(Debug)]
pub enum OutputOpts {
    SingleByte { value: Option<Vec<u8>> },
    None,
}

impl OutputOpts {
    pub fn is_none(&self) -> bool {
        matches!(self, OutputOpts::None)
    }

    /// `into_value` returns the fetched bytes, a missing key and a write output are both `None`
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            OutputOpts::SingleByte { value } => value,
            OutputOpts::None => None,
        }
    }
}
