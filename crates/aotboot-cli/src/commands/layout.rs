use crate::error::CliError;
use aotboot_layout::LayoutContract;
use std::fmt::Write;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutFormat {
    /// Aligned name/value lines
    Text,
    /// TOML, as an image would record it
    Toml,
}

pub fn handle_layout(format: LayoutFormat) -> Result<String, CliError> {
    let contract = LayoutContract::host();
    log::debug!("Host layout contract: {:?}", contract);

    match format {
        LayoutFormat::Text => Ok(render_text(&contract)),
        LayoutFormat::Toml => toml::to_string_pretty(&contract).map_err(|source| CliError::Render {
            what: "layout contract",
            source,
        }),
    }
}

fn render_text(contract: &LayoutContract) -> String {
    let fields = [
        ("pointer_size", contract.pointer_size),
        ("type_descriptor_offset", contract.type_descriptor_offset),
        ("length_offset", contract.length_offset),
        ("data_offset", contract.data_offset),
        ("char_size", contract.char_size),
    ];
    let mut out = String::new();
    for (name, value) in fields {
        let _ = writeln!(out, "{:<24}{}", name, value);
    }
    out
}
