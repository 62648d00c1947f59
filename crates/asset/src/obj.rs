//! OBJ parser supporting positions, normals, texture coordinates, polygonal
//! faces and MTL material libraries.
//!
//! Parsing is best-effort: a malformed line is recorded as a [`Diagnostic`]
//! and skipped, the rest of the file is still loaded.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    str::SplitWhitespace,
};

use crate::{
    error::{Diagnostic, LineError, LoadError, LoadReport},
    model::{Face, FaceVertex, Model},
    mtl,
    parse::{decode_line, directive, parse_floats},
};

/// Load an OBJ model from a file path. Material libraries are resolved
/// relative to the file's directory.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<LoadReport<Model>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    let report = load_obj_from_reader(
        BufReader::new(file),
        &path.display().to_string(),
        path.parent(),
    )?;
    log::info!(
        "Loaded OBJ {}: {} vertices, {} faces, {} materials",
        path.display(),
        report.value.positions.len(),
        report.value.faces.len(),
        report.value.materials.len()
    );
    if !report.is_clean() {
        log::warn!(
            "{} problem(s) while loading {}",
            report.diagnostics.len(),
            path.display()
        );
    }
    Ok(report)
}

/// Load an OBJ model from a [`BufRead`] implementation.
///
/// `origin` labels diagnostics; `base_dir` is where `mtllib` files are looked up
/// (the current directory when `None`). Lines that aren't valid UTF-8 are
/// reported and skipped; only a failing read aborts the load.
pub fn load_obj_from_reader<R: BufRead>(
    reader: R,
    origin: &str,
    base_dir: Option<&Path>,
) -> Result<LoadReport<Model>, LoadError> {
    let builder = reader
        .split(b'\n')
        .enumerate()
        .try_fold(ObjBuilder::new(origin, base_dir), |mut b, (idx, bytes)| {
            b.feed_raw(idx + 1, &bytes?);
            Ok::<_, io::Error>(b)
        })
        .map_err(|e| LoadError::from_io(origin, e))?;
    Ok(builder.finish())
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> LoadReport<Model> {
    contents
        .lines()
        .enumerate()
        .fold(ObjBuilder::new("<str>", None), |mut b, (idx, line)| {
            b.feed(idx + 1, line);
            b
        })
        .finish()
}

/// Accumulator threaded through the line fold.
struct ObjBuilder {
    origin: String,
    base_dir: Option<PathBuf>,
    model: Model,
    current_material: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ObjBuilder {
    fn new(origin: &str, base_dir: Option<&Path>) -> Self {
        Self {
            origin: origin.to_owned(),
            base_dir: base_dir.map(Path::to_path_buf),
            model: Model::default(),
            current_material: None,
            diagnostics: Vec::new(),
        }
    }

    fn feed_raw(&mut self, line_no: usize, bytes: &[u8]) {
        match decode_line(bytes) {
            Ok(line) => self.feed(line_no, line),
            Err(error) => self.reject(line_no, error),
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) {
        if let Err(error) = self.apply(line_no, line) {
            self.reject(line_no, error);
        }
    }

    fn diagnostic(&self, line_no: usize, error: LineError) -> Diagnostic {
        Diagnostic::Line {
            origin: self.origin.clone(),
            line: line_no,
            error,
        }
    }

    fn reject(&mut self, line_no: usize, error: LineError) {
        let diag = self.diagnostic(line_no, error);
        log::warn!("Skipping OBJ line: {diag}");
        self.diagnostics.push(diag);
    }

    fn apply(&mut self, line_no: usize, line: &str) -> Result<(), LineError> {
        let Some((tag, mut parts)) = directive(line) else {
            return Ok(());
        };

        match tag {
            "v" => {
                let p = parse_floats(&mut parts, ["x coordinate", "y coordinate", "z coordinate"])?;
                self.model.positions.push(p);
            }
            "vn" => {
                let n = parse_floats(&mut parts, ["nx coordinate", "ny coordinate", "nz coordinate"])?;
                self.model.normals.push(n);
            }
            "vt" => {
                let t = parse_floats(&mut parts, ["u coordinate", "v coordinate"])?;
                self.model.tex_coords.push(t);
            }
            "mtllib" => self.load_material_libraries(parts)?,
            "usemtl" => {
                let name = parts.next().ok_or(LineError::MissingName("material"))?;
                self.current_material = Some(name.to_owned());
            }
            "f" => {
                let face = self.parse_face(parts)?;
                // kept as-is; the draw step falls back when the entry is missing
                if let Some(error) = self.dangling_attribute(&face) {
                    let diag = self.diagnostic(line_no, error);
                    log::debug!("Keeping face with dangling index: {diag}");
                    self.diagnostics.push(diag);
                }
                self.model.faces.push(face);
            }
            other => log::trace!("Ignoring OBJ directive '{other}'"),
        }
        Ok(())
    }

    fn parse_face(&self, parts: SplitWhitespace<'_>) -> Result<Face, LineError> {
        let vertices = parts
            .map(|token| parse_face_vertex(token, self.model.positions.len()))
            .collect::<Result<Vec<_>, _>>()?;
        if vertices.len() < 3 {
            return Err(LineError::TooFewVertices(vertices.len()));
        }
        Ok(Face::new(vertices, self.current_material.clone()))
    }

    /// First texture or normal index of `face` with no entry declared so far.
    fn dangling_attribute(&self, face: &Face) -> Option<LineError> {
        let check = |index: Option<usize>, len: usize, kind: &'static str| {
            index
                .filter(|&i| i >= len)
                .map(|i| LineError::IndexOutOfRange {
                    kind,
                    index: i + 1,
                    len,
                })
        };
        face.vertices.iter().find_map(|v| {
            check(v.tex_coord, self.model.tex_coords.len(), "texture")
                .or_else(|| check(v.normal, self.model.normals.len(), "normal"))
        })
    }

    fn load_material_libraries(&mut self, parts: SplitWhitespace<'_>) -> Result<(), LineError> {
        let mut any = false;
        for name in parts {
            any = true;
            let path = match &self.base_dir {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            };
            match mtl::load_mtl_from_path(&path) {
                Ok(report) => {
                    self.model.materials.extend(report.value);
                    self.diagnostics.extend(report.diagnostics);
                }
                Err(err) => {
                    log::warn!("Material library unavailable: {err}");
                    self.diagnostics.push(Diagnostic::File(err));
                }
            }
        }
        if any {
            Ok(())
        } else {
            Err(LineError::MissingName("material library"))
        }
    }

    fn finish(self) -> LoadReport<Model> {
        LoadReport {
            value: self.model,
            diagnostics: self.diagnostics,
        }
    }
}

/// Parses `i`, `i/t`, `i//n` or `i/t/n` into 0-based indices.
///
/// The position must refer to a vertex declared so far. Texture and normal
/// indices only have to be well-formed; whether they resolve is left to the
/// caller.
fn parse_face_vertex(token: &str, pos_count: usize) -> Result<FaceVertex, LineError> {
    let mut split = token.split('/');
    let position = match split.next() {
        Some(value) if !value.is_empty() => one_based(value)?,
        _ => return Err(LineError::MissingField("vertex index")),
    };
    if position >= pos_count {
        return Err(LineError::IndexOutOfRange {
            kind: "vertex",
            index: position + 1,
            len: pos_count,
        });
    }

    let mut attribute = || {
        split
            .next()
            .filter(|value| !value.is_empty())
            .map(one_based)
            .transpose()
    };
    let tex_coord = attribute()?;
    let normal = attribute()?;

    Ok(FaceVertex::new(position, tex_coord, normal))
}

fn one_based(token: &str) -> Result<usize, LineError> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| LineError::InvalidIndex(token.to_owned()))?;
    if raw == 0 {
        return Err(LineError::ZeroIndex);
    }
    if raw < 0 {
        return Err(LineError::NegativeIndex(token.to_owned()));
    }
    usize::try_from(raw - 1).map_err(|_| LineError::InvalidIndex(token.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testdata(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
    }

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let report = load_obj_from_str(src);
        assert!(report.is_clean());
        let model = report.value;
        assert_eq!(model.positions.len(), 3);
        assert_eq!(model.normals.len(), 1);
        assert_eq!(model.tex_coords.len(), 3);
        assert_eq!(model.faces.len(), 1);
        assert_eq!(
            model.faces[0].vertices,
            vec![
                FaceVertex::new(0, Some(0), Some(0)),
                FaceVertex::new(1, Some(1), Some(0)),
                FaceVertex::new(2, Some(2), Some(0)),
            ]
        );
    }

    #[test]
    fn face_token_forms_convert_to_zero_based() {
        assert_eq!(
            parse_face_vertex("5", 5).unwrap(),
            FaceVertex::new(4, None, None)
        );
        assert_eq!(
            parse_face_vertex("5/2", 5).unwrap(),
            FaceVertex::new(4, Some(1), None)
        );
        assert_eq!(
            parse_face_vertex("5//3", 5).unwrap(),
            FaceVertex::new(4, None, Some(2))
        );
        assert_eq!(
            parse_face_vertex("5/2/3", 5).unwrap(),
            FaceVertex::new(4, Some(1), Some(2))
        );
    }

    #[test]
    fn bad_indices_are_rejected() {
        assert_eq!(parse_face_vertex("0", 3), Err(LineError::ZeroIndex));
        assert_eq!(
            parse_face_vertex("-1", 3),
            Err(LineError::NegativeIndex("-1".into()))
        );
        assert_eq!(
            parse_face_vertex("4", 3),
            Err(LineError::IndexOutOfRange {
                kind: "vertex",
                index: 4,
                len: 3
            })
        );
        assert_eq!(parse_face_vertex("1//0", 3), Err(LineError::ZeroIndex));
        assert_eq!(
            parse_face_vertex("1/t", 3),
            Err(LineError::InvalidIndex("t".into()))
        );
        assert_eq!(
            parse_face_vertex("x/1", 3),
            Err(LineError::InvalidIndex("x".into()))
        );
        assert_eq!(
            parse_face_vertex("/1", 3),
            Err(LineError::MissingField("vertex index"))
        );
    }

    #[test]
    fn attribute_indices_are_not_range_checked() {
        assert_eq!(
            parse_face_vertex("1/7/2", 3),
            Ok(FaceVertex::new(0, Some(6), Some(1)))
        );
    }

    #[test]
    fn face_with_dangling_normals_is_kept() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n";
        let report = load_obj_from_str(src);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.diagnostics[0].line_error(),
            Some(&LineError::IndexOutOfRange {
                kind: "normal",
                index: 1,
                len: 0
            })
        );

        let mut model = report.value;
        assert_eq!(model.faces.len(), 1);
        assert_eq!(
            model.faces[0].normal_indices().collect::<Vec<_>>(),
            vec![Some(0); 3]
        );
        assert_eq!(crate::normals::reconstruct_flat_normals(&mut model), 1);
        assert_eq!(model.faces[0].flat_normal, Some([0.0, 0.0, 1.0]));
    }

    #[test]
    fn undecodable_line_is_skipped() {
        let src: &[u8] = b"v 0 0 0\nv 1 0 0\r\nv 0 1 0\n# caf\xE9\nf 1 2 3\n";
        let report = load_obj_from_reader(src, "latin1.obj", None).expect("read");
        assert_eq!(report.diagnostics.len(), 1);
        match &report.diagnostics[0] {
            Diagnostic::Line { line, error, .. } => {
                assert_eq!(*line, 4);
                assert_eq!(*error, LineError::InvalidEncoding(5));
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
        assert_eq!(report.value.positions.len(), 3);
        assert_eq!(report.value.faces.len(), 1);
    }

    #[test]
    fn faces_keep_their_polygon_size() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v -1 0.5 0
f 1 2 3
f 1 2 3 4
f 1 2 3 4 5
";
        let model = load_obj_from_str(src).value;
        let sizes: Vec<_> = model.faces.iter().map(Face::len).collect();
        assert_eq!(sizes, vec![3, 4, 5]);
    }

    #[test]
    fn malformed_lines_are_skipped_and_reported() {
        let src = "\
v 0 0 0
v 1 0 oops
v 1 0 0
v 0 1
v 0 1 0
f 1 2
f 1 2 9
f 1 2 3
";
        let report = load_obj_from_str(src);
        let lines: Vec<_> = report
            .diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::Line { line, .. } => *line,
                Diagnostic::File(e) => panic!("unexpected file diagnostic {e}"),
            })
            .collect();
        assert_eq!(lines, vec![2, 4, 6, 7]);
        assert_eq!(
            report.diagnostics[2].line_error(),
            Some(&LineError::TooFewVertices(2))
        );
        assert_eq!(report.value.positions.len(), 3);
        assert_eq!(report.value.faces.len(), 1);
    }

    #[test]
    fn usemtl_is_snapshotted_per_face() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
usemtl red
f 1 2 3
usemtl blue
f 3 2 1
";
        let model = load_obj_from_str(src).value;
        let materials: Vec<_> = model.faces.iter().map(|f| f.material.as_deref()).collect();
        assert_eq!(materials, vec![None, Some("red"), Some("blue")]);
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let report = load_obj_from_str("o hand\ng palm\ns 1\nv 0 0 0\n");
        assert!(report.is_clean());
        assert_eq!(report.value.positions.len(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_obj_from_path(testdata("missing.obj")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn loads_file_with_material_library() {
        let report = load_obj_from_path(testdata("quad.obj")).expect("load quad.obj");
        assert!(report.is_clean(), "{:?}", report.diagnostics);
        let model = report.value;
        assert_eq!(model.positions.len(), 4);
        assert_eq!(model.faces.len(), 2);
        assert_eq!(model.faces[0].material.as_deref(), Some("red"));
        assert_eq!(model.materials["red"].diffuse, Some([1.0, 0.0, 0.0]));
        assert_eq!(model.face_diffuse(&model.faces[1]), Some([0.0, 0.5, 1.0]));
    }

    #[test]
    fn missing_material_library_is_a_diagnostic() {
        let report = load_obj_from_path(testdata("dangling_mtl.obj")).expect("load");
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(
            report.diagnostics[0],
            Diagnostic::File(LoadError::NotFound { .. })
        ));
        let model = report.value;
        assert!(model.materials.is_empty());
        assert_eq!(model.faces.len(), 1);
        assert_eq!(model.faces[0].material.as_deref(), Some("ghost"));
        assert_eq!(model.face_diffuse(&model.faces[0]), None);
    }
}
