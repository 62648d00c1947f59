//! MTL material library parser (`newmtl`, `Kd`, `Ka`, `Ks`, `Ns`, `d`).

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{Diagnostic, LineError, LoadError, LoadReport},
    model::{Material, MaterialLibrary},
    parse::{decode_line, directive, parse_f32, parse_floats},
};

/// Load a material library from a file path.
pub fn load_mtl_from_path(path: impl AsRef<Path>) -> Result<LoadReport<MaterialLibrary>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    let report = load_mtl_from_reader(BufReader::new(file), &path.display().to_string())?;
    log::info!(
        "Loaded MTL {}: {} materials",
        path.display(),
        report.value.len()
    );
    Ok(report)
}

/// Load a material library from any [`BufRead`]; `origin` labels diagnostics
/// and read errors. Undecodable lines are reported and skipped.
pub fn load_mtl_from_reader<R: BufRead>(
    reader: R,
    origin: &str,
) -> Result<LoadReport<MaterialLibrary>, LoadError> {
    let builder = reader
        .split(b'\n')
        .enumerate()
        .try_fold(MtlBuilder::new(origin), |mut b, (idx, bytes)| {
            match decode_line(&bytes?) {
                Ok(line) => b.feed(idx + 1, line),
                Err(error) => b.reject(idx + 1, error),
            }
            Ok::<_, io::Error>(b)
        })
        .map_err(|e| LoadError::from_io(origin, e))?;
    Ok(builder.finish())
}

/// Convenience helper to parse an MTL string literal.
pub fn load_mtl_from_str(contents: &str) -> LoadReport<MaterialLibrary> {
    contents
        .lines()
        .enumerate()
        .fold(MtlBuilder::new("<str>"), |mut b, (idx, line)| {
            b.feed(idx + 1, line);
            b
        })
        .finish()
}

struct MtlBuilder {
    origin: String,
    library: MaterialLibrary,
    current: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl MtlBuilder {
    fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_owned(),
            library: MaterialLibrary::new(),
            current: None,
            diagnostics: Vec::new(),
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) {
        if let Err(error) = self.apply(line) {
            self.reject(line_no, error);
        }
    }

    fn reject(&mut self, line_no: usize, error: LineError) {
        let diag = Diagnostic::Line {
            origin: self.origin.clone(),
            line: line_no,
            error,
        };
        log::warn!("Skipping MTL line: {diag}");
        self.diagnostics.push(diag);
    }

    fn apply(&mut self, line: &str) -> Result<(), LineError> {
        let Some((tag, mut parts)) = directive(line) else {
            return Ok(());
        };

        if tag == "newmtl" {
            let name = parts.next().ok_or(LineError::MissingName("material"))?;
            self.library.start(name);
            self.current = Some(name.to_owned());
            return Ok(());
        }

        // Properties before the first `newmtl` have nowhere to go.
        let Some(material) = self
            .current
            .as_deref()
            .and_then(|name| self.library.get_mut(name))
        else {
            return Ok(());
        };

        apply_property(material, tag, &mut parts)
    }

    fn finish(self) -> LoadReport<MaterialLibrary> {
        LoadReport {
            value: self.library,
            diagnostics: self.diagnostics,
        }
    }
}

fn apply_property(
    material: &mut Material,
    tag: &str,
    parts: &mut std::str::SplitWhitespace<'_>,
) -> Result<(), LineError> {
    match tag {
        "Kd" => material.diffuse = Some(parse_floats(parts, ["Kd red", "Kd green", "Kd blue"])?),
        "Ka" => material.ambient = Some(parse_floats(parts, ["Ka red", "Ka green", "Ka blue"])?),
        "Ks" => material.specular = Some(parse_floats(parts, ["Ks red", "Ks green", "Ks blue"])?),
        "Ns" => material.shininess = Some(parse_f32(parts.next(), "Ns exponent")?),
        "d" => material.dissolve = Some(parse_f32(parts.next(), "dissolve")?),
        other => log::trace!("Ignoring MTL directive '{other}'"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newmtl_then_kd_sets_diffuse() {
        let report = load_mtl_from_str("newmtl red\nKd 1 0 0\n");
        assert!(report.is_clean());
        assert_eq!(report.value["red"].diffuse, Some([1.0, 0.0, 0.0]));
    }

    #[test]
    fn properties_attach_to_the_current_material() {
        let src = r#"
            # two materials
            newmtl skin
            Ka 0.1 0.1 0.1
            Kd 0.8 0.6 0.4
            Ks 0.5 0.5 0.5
            Ns 32
            d 0.9
            illum 2
            newmtl nail
            Kd 1.0 0.9 0.9
        "#;
        let report = load_mtl_from_str(src);
        assert!(report.is_clean());
        let lib = report.value;
        assert_eq!(lib.len(), 2);
        let skin = lib.get("skin").unwrap();
        assert_eq!(skin.diffuse, Some([0.8, 0.6, 0.4]));
        assert_eq!(skin.ambient, Some([0.1, 0.1, 0.1]));
        assert_eq!(skin.specular, Some([0.5, 0.5, 0.5]));
        assert_eq!(skin.shininess, Some(32.0));
        assert_eq!(skin.dissolve, Some(0.9));
        assert_eq!(lib.diffuse("nail"), Some([1.0, 0.9, 0.9]));
    }

    #[test]
    fn kd_before_newmtl_is_ignored() {
        let report = load_mtl_from_str("Kd 1 1 1\nnewmtl a\n");
        assert!(report.is_clean());
        assert_eq!(report.value.diffuse("a"), None);
    }

    #[test]
    fn malformed_kd_is_reported_and_parsing_continues() {
        let report = load_mtl_from_str("newmtl a\nKd 1 zero 0\nnewmtl b\nKd 0 0 1\n");
        assert_eq!(report.diagnostics.len(), 1);
        match &report.diagnostics[0] {
            Diagnostic::Line { line, error, .. } => {
                assert_eq!(*line, 2);
                assert!(matches!(error, LineError::InvalidNumber { .. }));
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
        assert_eq!(report.value.diffuse("a"), None);
        assert_eq!(report.value.diffuse("b"), Some([0.0, 0.0, 1.0]));
    }

    #[test]
    fn reader_skips_undecodable_lines() {
        let src: &[u8] = b"newmtl a\r\nKd 1 0 0\r\n# \xFF\nnewmtl b\nKd 0 1 0\n";
        let report = load_mtl_from_reader(src, "mixed.mtl").expect("read");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.diagnostics[0].line_error(),
            Some(&LineError::InvalidEncoding(2))
        );
        assert_eq!(report.value.diffuse("a"), Some([1.0, 0.0, 0.0]));
        assert_eq!(report.value.diffuse("b"), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn newmtl_without_name_is_reported() {
        let report = load_mtl_from_str("newmtl\n");
        assert_eq!(
            report.diagnostics[0].line_error(),
            Some(&LineError::MissingName("material"))
        );
        assert!(report.value.is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_mtl_from_path("nope/missing.mtl").unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }
}
