#![deny(clippy::print_stdout)]

pub use kefel_asm as asm;
pub use kefel_codegen as codegen;
pub use kefel_executor as executor;

pub use kefel_asm::{Instruction, Reg, Routine};
pub use kefel_codegen::{generate, generate_named, MulPlan};
pub use kefel_executor::{execute, ExecutionError};

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A generated multiply-by-constant routine, ready to be applied to operands
/// or written out as an assembly file.
pub struct Kefel {
    k: i32,
    routine: Routine,
}

impl Kefel {
    pub fn new(k: i32) -> Self {
        Self {
            k,
            routine: kefel_codegen::generate(k),
        }
    }

    pub fn with_name(k: i32, name: &str) -> Self {
        Self {
            k,
            routine: kefel_codegen::generate_named(k, name),
        }
    }

    pub fn multiplier(&self) -> i32 {
        self.k
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    /// Runs the routine on `x` with C `int` semantics: 64-bit register
    /// arithmetic, result truncated to 32 bits.
    pub fn apply(&self, x: i32) -> i32 {
        // Generated routines always terminate in `ret` with in-range shifts.
        kefel_executor::execute(&self.routine, x as i64)
            .unwrap_or_else(|e| panic!("generated routine failed to execute: {e}")) as i32
    }

    /// Writes `<dir>/<name>.s` and returns the path.
    pub fn write_assembly_file(&self, dir: &Path) -> Result<PathBuf, io::Error> {
        let path = dir.join(format!("{}.s", self.routine.name()));
        buffered_write_file(&path, |writer| write!(writer, "{}", self.routine))?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Multiplies via a freshly generated routine, truncating to `i32`.
pub fn multiply(k: i32, x: i32) -> i32 {
    Kefel::new(k).apply(x)
}

pub fn buffered_write_file<T>(
    path: &Path,
    do_write: impl FnOnce(&mut BufWriter<fs::File>) -> Result<T, io::Error>,
) -> Result<T, io::Error> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    let result = do_write(&mut writer)?;
    writer.flush()?;
    Ok(result)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn apply_matches_native_product() {
        assert_eq!(Kefel::new(12).apply(11), 132);
        assert_eq!(multiply(-9, 9), -81);
        assert_eq!(multiply(i32::MAX, 2), i32::MAX.wrapping_mul(2));
    }

    #[test]
    fn write_assembly_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Kefel::new(6).write_assembly_file(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "kefel.s");
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with(".text\n.global kefel\nkefel:\n"));
        assert!(contents.ends_with("    ret\n"));
    }

    #[test]
    fn write_assembly_file_custom_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = Kefel::with_name(5, "times_five")
            .write_assembly_file(dir.path())
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "times_five.s");
    }
}
