use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

pub trait Importable {
    fn import(reader: &mut dyn BufRead) -> Result<Self>
    where
        Self: Sized;

    fn import_from_path(path: &Path) -> Result<Self>
    where
        Self: Sized,
    {
        let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
        let mut reader = BufReader::new(file);
        Self::import(&mut reader).with_context(|| format!("could not import {}", path.display()))
    }
}
