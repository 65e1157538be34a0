use super::{Primitive, SceneObjectContainer};

use crate::config::TraceSettings;
use crate::spectrum::Color;

use simple_error::{bail, SimpleResult};

use std::collections::HashSet;

// Collects the primitives of a scene, making sure every one of them can be told apart
// by name in the logs:
pub struct SceneBuilder {
    names: HashSet<String>,
    container: SceneObjectContainer,
}

impl SceneBuilder {
    pub fn new() -> Self {
        SceneBuilder {
            names: HashSet::new(),
            container: SceneObjectContainer::new(),
        }
    }

    /// Picks up the self-intersection epsilon from the settings.
    pub fn from_settings(settings: &TraceSettings) -> Self {
        let mut builder = SceneBuilder::new();
        builder.container = builder
            .container
            .with_origin_epsilon(settings.self_intersection_epsilon);
        builder
    }

    pub fn background(mut self, background: Color) -> Self {
        self.container = self.container.with_background(background);
        self
    }

    pub fn add<P: Primitive + 'static>(&mut self, primitive: P) -> SimpleResult<()> {
        // First check if we already have a name that matches this one:
        if !self.names.insert(primitive.name().to_string()) {
            bail!("Primitive name: \"{}\" is not unique.", primitive.name());
        }
        self.container.add(primitive);
        Ok(())
    }

    pub fn build(self) -> SceneObjectContainer {
        self.container
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        SceneBuilder::new()
    }
}

