use anyhow::Result;

pub trait Exportable {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()>;
}
