//! Line-oriented scene file parser.
//!
//! The format is a sequence of MATERIAL / CAMERA / OBJECT records separated
//! by blank lines. Tokens are case-insensitive and `//` starts a comment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lumen_math::Vec3;

use crate::{
    load_gltf, CameraConfig, Geom, Material, Primitive, SceneDescription, SceneError,
};

/// Read and parse a scene file. Mesh paths are resolved relative to the
/// scene file's directory.
pub fn load_scene(path: impl AsRef<Path>) -> Result<SceneDescription, SceneError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_scene(&text, path.parent())
}

/// Parse scene text. `base_dir` anchors relative mesh paths.
pub fn parse_scene(text: &str, base_dir: Option<&Path>) -> Result<SceneDescription, SceneError> {
    let mut parser = Parser::new(base_dir);

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = match raw.find("//") {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.is_empty() {
            // Blank lines close the current record.
            parser.finish_record()?;
            continue;
        }

        parser.line(line_no, &tokens)?;
    }
    parser.finish_record()?;

    parser.finish()
}

enum Shape {
    Cube,
    Sphere,
    Gltf(PathBuf),
}

struct MaterialRecord {
    id: String,
    color: Vec3,
    specular: Vec3,
    reflective: bool,
    refractive: bool,
    ior: f32,
    emittance: f32,
}

struct ObjectRecord {
    line: usize,
    shape: Option<Shape>,
    material: Option<String>,
    translation: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

enum Record {
    None,
    Material(MaterialRecord),
    Camera(CameraConfig),
    Object(ObjectRecord),
}

struct Parser {
    base_dir: Option<PathBuf>,
    record: Record,
    material_ids: HashMap<String, u32>,
    scene: SceneDescription,
    camera_seen: bool,
}

impl Parser {
    fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
            record: Record::None,
            material_ids: HashMap::new(),
            scene: SceneDescription::default(),
            camera_seen: false,
        }
    }

    fn line(&mut self, line_no: usize, tokens: &[&str]) -> Result<(), SceneError> {
        let key = tokens[0].to_ascii_uppercase();

        // An open OBJECT record claims its own `material <id>` binding line;
        // a MATERIAL token anywhere else begins a new material record.
        let starts_material = key == "MATERIAL" && !matches!(self.record, Record::Object(_));

        if starts_material {
            self.finish_record()?;
            let id = expect_token(tokens, 1, line_no, "material id")?;
            self.record = Record::Material(MaterialRecord {
                id: id.to_string(),
                color: Vec3::ZERO,
                specular: Vec3::ZERO,
                reflective: false,
                refractive: false,
                ior: 0.0,
                emittance: 0.0,
            });
            return Ok(());
        }

        match key.as_str() {
            "CAMERA" => {
                self.finish_record()?;
                self.record = Record::Camera(CameraConfig::default());
            }
            "OBJECT" => {
                self.finish_record()?;
                self.record = Record::Object(ObjectRecord {
                    line: line_no,
                    shape: None,
                    material: None,
                    translation: Vec3::ZERO,
                    rotation: Vec3::ZERO,
                    scale: Vec3::ONE,
                });
            }
            _ => match &mut self.record {
                Record::Material(mat) => Self::material_line(mat, &key, tokens, line_no)?,
                Record::Camera(cam) => Self::camera_line(cam, &key, tokens, line_no)?,
                Record::Object(obj) => Self::object_line(obj, &key, tokens, line_no)?,
                Record::None => {
                    return Err(SceneError::parse(
                        line_no,
                        format!("unexpected token `{}` outside any record", tokens[0]),
                    ));
                }
            },
        }
        Ok(())
    }

    fn material_line(
        mat: &mut MaterialRecord,
        key: &str,
        tokens: &[&str],
        line_no: usize,
    ) -> Result<(), SceneError> {
        match key {
            "RGB" => mat.color = parse_vec3(tokens, line_no)?,
            "SPECRGB" => mat.specular = parse_vec3(tokens, line_no)?,
            // Specular exponent: accepted for compatibility, the perfect
            // specular BSDF has no use for it.
            "SPECEX" => {
                parse_f32(tokens, 1, line_no)?;
            }
            "REFL" => mat.reflective = parse_f32(tokens, 1, line_no)? != 0.0,
            "REFR" => mat.refractive = parse_f32(tokens, 1, line_no)? != 0.0,
            "REFRIOR" => mat.ior = parse_f32(tokens, 1, line_no)?,
            "EMITTANCE" => mat.emittance = parse_f32(tokens, 1, line_no)?,
            _ => {
                return Err(SceneError::parse(
                    line_no,
                    format!("unknown material key `{}`", key),
                ))
            }
        }
        Ok(())
    }

    fn camera_line(
        cam: &mut CameraConfig,
        key: &str,
        tokens: &[&str],
        line_no: usize,
    ) -> Result<(), SceneError> {
        match key {
            "RES" => {
                cam.resolution = (
                    parse_u32(tokens, 1, line_no)?,
                    parse_u32(tokens, 2, line_no)?,
                )
            }
            "FOVY" => cam.fovy_degrees = parse_f32(tokens, 1, line_no)?,
            "ITERATIONS" => cam.iterations = parse_u32(tokens, 1, line_no)?,
            "DEPTH" => cam.trace_depth = parse_u32(tokens, 1, line_no)?,
            "FILE" => cam.output_name = expect_token(tokens, 1, line_no, "file name")?.to_string(),
            "EYE" => cam.eye = parse_vec3(tokens, line_no)?,
            "LOOKAT" => cam.look_at = parse_vec3(tokens, line_no)?,
            "UP" => cam.up = parse_vec3(tokens, line_no)?,
            "APERTURE" => cam.aperture_radius = parse_f32(tokens, 1, line_no)?,
            "FOCALLENGTH" => cam.focal_length = parse_f32(tokens, 1, line_no)?,
            _ => {
                return Err(SceneError::parse(
                    line_no,
                    format!("unknown camera key `{}`", key),
                ))
            }
        }
        Ok(())
    }

    fn object_line(
        obj: &mut ObjectRecord,
        key: &str,
        tokens: &[&str],
        line_no: usize,
    ) -> Result<(), SceneError> {
        match key {
            "CUBE" => obj.shape = Some(Shape::Cube),
            "SPHERE" => obj.shape = Some(Shape::Sphere),
            "GLTF" => {
                let path = expect_token(tokens, 1, line_no, "mesh path")?;
                obj.shape = Some(Shape::Gltf(PathBuf::from(path)));
            }
            "MATERIAL" => {
                obj.material =
                    Some(expect_token(tokens, 1, line_no, "material id")?.to_string());
            }
            "TRANS" => obj.translation = parse_vec3(tokens, line_no)?,
            "ROTAT" => obj.rotation = parse_vec3(tokens, line_no)?,
            "SCALE" => obj.scale = parse_vec3(tokens, line_no)?,
            _ => {
                return Err(SceneError::parse(
                    line_no,
                    format!("unknown object key `{}`", key),
                ))
            }
        }
        Ok(())
    }

    fn finish_record(&mut self) -> Result<(), SceneError> {
        match std::mem::replace(&mut self.record, Record::None) {
            Record::None => {}
            Record::Material(mat) => {
                let index = self.scene.materials.len() as u32;
                self.material_ids.insert(mat.id.clone(), index);
                self.scene.materials.push(Material::from_flags(
                    mat.color,
                    mat.specular,
                    mat.reflective,
                    mat.refractive,
                    mat.ior,
                    mat.emittance,
                ));
            }
            Record::Camera(cam) => {
                self.scene.camera = cam;
                self.camera_seen = true;
            }
            Record::Object(obj) => {
                let shape = obj.shape.ok_or_else(|| {
                    SceneError::parse(obj.line, "object has no shape (cube, sphere, or gltf)")
                })?;
                let material_key = obj.material.ok_or_else(|| {
                    SceneError::parse(obj.line, "object has no material binding")
                })?;
                let material_id = *self
                    .material_ids
                    .get(&material_key)
                    .ok_or(SceneError::UnknownMaterial(material_key))?;

                let primitive = match shape {
                    Shape::Cube => Primitive::Cube,
                    Shape::Sphere => Primitive::Sphere,
                    Shape::Gltf(path) => {
                        let resolved = match &self.base_dir {
                            Some(base) if path.is_relative() => base.join(&path),
                            _ => path,
                        };
                        let tri_start = self.scene.triangles.len() as u32;
                        let mut triangles = load_gltf(&resolved)?;
                        let tri_count = triangles.len() as u32;
                        self.scene.triangles.append(&mut triangles);
                        Primitive::Mesh {
                            tri_start,
                            tri_count,
                        }
                    }
                };

                self.scene.geoms.push(Geom::new(
                    primitive,
                    material_id,
                    obj.translation,
                    obj.rotation,
                    obj.scale,
                ));
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<SceneDescription, SceneError> {
        if !self.camera_seen {
            return Err(SceneError::MissingCamera);
        }
        log::info!(
            "scene: {} materials, {} geoms, {} triangles",
            self.scene.materials.len(),
            self.scene.geoms.len(),
            self.scene.triangles.len()
        );
        Ok(self.scene)
    }
}

fn expect_token<'a>(
    tokens: &[&'a str],
    index: usize,
    line_no: usize,
    what: &str,
) -> Result<&'a str, SceneError> {
    tokens
        .get(index)
        .copied()
        .ok_or_else(|| SceneError::parse(line_no, format!("missing {}", what)))
}

fn parse_f32(tokens: &[&str], index: usize, line_no: usize) -> Result<f32, SceneError> {
    let token = expect_token(tokens, index, line_no, "number")?;
    token
        .parse()
        .map_err(|_| SceneError::parse(line_no, format!("`{}` is not a number", token)))
}

fn parse_u32(tokens: &[&str], index: usize, line_no: usize) -> Result<u32, SceneError> {
    let token = expect_token(tokens, index, line_no, "integer")?;
    token
        .parse()
        .map_err(|_| SceneError::parse(line_no, format!("`{}` is not an integer", token)))
}

fn parse_vec3(tokens: &[&str], line_no: usize) -> Result<Vec3, SceneError> {
    Ok(Vec3::new(
        parse_f32(tokens, 1, line_no)?,
        parse_f32(tokens, 2, line_no)?,
        parse_f32(tokens, 3, line_no)?,
    ))
}
