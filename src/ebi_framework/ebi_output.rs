use anyhow::{Context, Result};
use std::{
    fmt::{self, Display},
    fs::File,
    io::Write,
    path::PathBuf,
};

use crate::{ebi_framework::exportable::Exportable, ebi_objects::alignments::Alignments};

pub enum EbiOutput {
    Alignments(Alignments),
}

impl EbiOutput {
    pub fn get_type(&self) -> EbiOutputType {
        match self {
            EbiOutput::Alignments(_) => EbiOutputType::Alignments,
        }
    }
}

#[derive(PartialEq, Eq)]
pub enum EbiOutputType {
    Alignments,
}

impl Display for EbiOutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EbiOutputType::Alignments => Display::fmt(&"alignments", f),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EbiExporter {
    Text,
    Json,
}

impl EbiExporter {
    pub fn export_from_object(&self, output: EbiOutput, f: &mut dyn std::io::Write) -> Result<()> {
        match (self, output) {
            (EbiExporter::Text, EbiOutput::Alignments(object)) => object.export(f),
            (EbiExporter::Json, EbiOutput::Alignments(object)) => object.export_json(f),
        }
    }
}

impl Display for EbiExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EbiExporter::Text => Display::fmt(&"text", f),
            EbiExporter::Json => Display::fmt(&"JSON", f),
        }
    }
}

pub fn export_object(to_file: &PathBuf, object: EbiOutput, exporter: EbiExporter) -> Result<()> {
    let file =
        File::create(to_file).with_context(|| format!("writing result to file {:?}", to_file))?;
    let mut writer = std::io::BufWriter::new(&file);
    exporter
        .export_from_object(object, &mut writer)
        .with_context(|| format!("writing result to file {:?}", to_file))?;
    writer
        .flush()
        .with_context(|| format!("writing result to file {:?}", to_file))
}

pub fn export_to_string(object: EbiOutput, exporter: EbiExporter) -> Result<String> {
    let mut f = vec![];
    exporter.export_from_object(object, &mut f)?;
    Ok(String::from_utf8(f)?)
}
