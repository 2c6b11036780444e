//! On-disk object and model library.
//!
//! Characterized objects and promoted models are kept as JSON files
//! (`<name>.object.json` / `<name>.model.json`) in a flat directory and
//! mirrored in memory for the session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lidar_pipeline::{CharacterizedObject, Model};

pub struct Library {
  dir: PathBuf,
  objects: HashMap<String, CharacterizedObject>,
  models: HashMap<String, Model>,
}

impl Library {
  /// Open (or create) a library directory and load everything in it.
  pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir)
      .with_context(|| format!("creating library directory {}", dir.display()))?;

    let mut library = Self {
      dir: dir.clone(),
      objects: HashMap::new(),
      models: HashMap::new(),
    };

    for entry in fs::read_dir(&dir)? {
      let path = entry?.path();
      let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        continue;
      };
      if let Some(name) = file_name.strip_suffix(".object.json") {
        library.objects.insert(name.to_string(), load(&path)?);
      } else if let Some(name) = file_name.strip_suffix(".model.json") {
        library.models.insert(name.to_string(), load(&path)?);
      }
    }

    Ok(library)
  }

  pub fn insert_object(&mut self, name: &str, object: CharacterizedObject) -> Result<()> {
    save(&self.dir.join(format!("{name}.object.json")), &object)?;
    self.objects.insert(name.to_string(), object);
    Ok(())
  }

  /// Copy a stored object into the model library under a new name.
  pub fn promote_model(&mut self, name: &str, object_name: &str) -> Result<()> {
    let object = self
      .objects
      .get(object_name)
      .with_context(|| format!("no stored object named '{object_name}'"))?
      .clone();
    save(&self.dir.join(format!("{name}.model.json")), &object)?;
    self.models.insert(name.to_string(), object);
    Ok(())
  }

  pub fn object(&self, name: &str) -> Option<&CharacterizedObject> {
    self.objects.get(name)
  }

  pub fn model(&self, name: &str) -> Option<&Model> {
    self.models.get(name)
  }

  pub fn object_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.objects.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }

  pub fn model_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }
}

fn load(path: &Path) -> Result<CharacterizedObject> {
  let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn save(path: &Path, object: &CharacterizedObject) -> Result<()> {
  let data = serde_json::to_string(object)?;
  fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}
