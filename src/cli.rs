use s1ap_per::io::per::Alignment;
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Parameters {
    #[arg(
        short = 'j',
        long = "json",
        env = "S1AP_JSON",
        help = "Whether to print the decoded value tree as JSON instead of the IE listing"
    )]
    pub json: bool,
    #[arg(
        value_enum,
        short = 'a',
        long = "alignment",
        env = "S1AP_ALIGNMENT",
        help = "Whether the input is padded to octet boundaries",
        default_value = "aligned"
    )]
    pub alignment: AlignmentArg,
    #[arg(
        env = "S1AP_INPUT",
        help = "The S1AP-PDU as hex string or '@' followed by the path of a binary file"
    )]
    pub input: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum AlignmentArg {
    Aligned,
    Unaligned,
}

impl From<AlignmentArg> for Alignment {
    fn from(alignment: AlignmentArg) -> Self {
        match alignment {
            AlignmentArg::Aligned => Alignment::Aligned,
            AlignmentArg::Unaligned => Alignment::Unaligned,
        }
    }
}

impl Parameters {
    /// The octets of the input, read from the file if prefixed by `@`
    pub fn input_bytes(&self) -> Result<Vec<u8>, String> {
        match self.input.strip_prefix('@') {
            Some(path) => std::fs::read(PathBuf::from(path))
                .map_err(|e| format!("Failed to read {path}: {e}")),
            None => parse_hex(&self.input).map_err(|e| format!("Invalid hex input: {e}")),
        }
    }
}

/// Whitespace and colons between the digits are ignored
pub fn parse_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect::<String>();
    hex::decode(digits)
}
