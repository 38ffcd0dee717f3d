// scene/scene.rs
use super::builder::Object;
use super::components::*;
use super::internal::transforms;
use crate::behavior::Behavior;
use crate::errors::{EngineError, Result};
use crate::scene::{ObjectId, Transform, WorldTransform};
use hecs::World;
use std::collections::HashMap;

/// Named collection of objects forming a forest of transform hierarchies.
///
/// Objects live in a hecs world; hierarchy edges are stored as [`Parent`] and
/// [`Children`] components, and every attached component kind is a separate
/// hecs component, so an object holds at most one component per kind.
pub struct Scene {
    world: World,
    /// Registration order, used for deterministic iteration.
    objects: Vec<(String, ObjectId)>,
    names: HashMap<String, ObjectId>,
    behaviors: Vec<(ObjectId, Box<dyn Behavior>)>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            objects: Vec::new(),
            names: HashMap::new(),
            behaviors: Vec::new(),
        }
    }

    /// Registers `object` under `name`. An object already registered under
    /// the same name is removed first. On error the scene is left unchanged.
    pub fn register_object(&mut self, name: impl Into<String>, object: Object) -> Result<ObjectId> {
        let name = name.into();
        let previous = self.names.get(&name).copied();
        if let Some(parent) = object.parent {
            self.ensure_contains(parent)?;
            // The replaced object is despawned before the new one is linked.
            if previous == Some(parent) {
                return Err(EngineError::NoSuchObject);
            }
        }
        if let Some(previous) = previous {
            log::debug!("Replacing object '{}'", name);
            self.remove_object(previous)?;
        }

        let mut bundle = object.spawn_bundle(&name);
        let id = self.world.spawn(bundle.build());
        self.objects.push((name.clone(), id));
        self.names.insert(name.clone(), id);

        if let Some(parent) = object.parent {
            self.set_parent(id, parent)?;
        }
        if let Some(behavior) = object.behavior {
            self.behaviors.push((id, behavior));
        }

        log::trace!("Registered object '{}' as {:?}", name, id);
        Ok(id)
    }

    /// Despawns an object. Its children become roots.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<()> {
        self.ensure_contains(id)?;
        self.clear_parent(id)?;
        for child in self.children(id) {
            let _ = self.world.remove_one::<Parent>(child);
        }
        self.world.despawn(id).map_err(|_| EngineError::NoSuchObject)?;

        self.objects.retain(|(_, object)| *object != id);
        self.names.retain(|_, object| *object != id);
        self.behaviors.retain(|(object, _)| *object != id);
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.world.contains(id)
    }

    pub fn name_of(&self, id: ObjectId) -> Option<String> {
        self.world.get::<&Name>(id).ok().map(|name| name.0.clone())
    }

    /// Objects in registration order.
    pub fn objects(&self) -> impl Iterator<Item = (&str, ObjectId)> + '_ {
        self.objects.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // ------------------------------------------------------------------
    // Enable flag
    // ------------------------------------------------------------------

    pub fn is_enabled(&self, id: ObjectId) -> bool {
        self.world
            .get::<&Enabled>(id)
            .map(|enabled| enabled.0)
            .unwrap_or(false)
    }

    pub fn set_enabled(&mut self, id: ObjectId, enabled: bool) -> Result<()> {
        let mut flag = self
            .world
            .get::<&mut Enabled>(id)
            .map_err(|_| EngineError::NoSuchObject)?;
        flag.0 = enabled;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Moves `child` under `parent`, removing it from its previous parent's
    /// children. Attaching to the current parent again is a no-op.
    pub fn set_parent(&mut self, child: ObjectId, parent: ObjectId) -> Result<()> {
        self.ensure_contains(child)?;
        self.ensure_contains(parent)?;

        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                let name = self.name_of(child).unwrap_or_default();
                return Err(EngineError::HierarchyCycle(name));
            }
            cursor = self.parent(node);
        }

        if self.parent(child) != Some(parent) {
            self.clear_parent(child)?;
        }
        self.world
            .insert_one(child, Parent(parent))
            .map_err(|_| EngineError::NoSuchObject)?;

        let mut children = self
            .world
            .get::<&mut Children>(parent)
            .map_err(|_| EngineError::NoSuchObject)?;
        if !children.0.contains(&child) {
            children.0.push(child);
        }
        Ok(())
    }

    pub fn clear_parent(&mut self, child: ObjectId) -> Result<()> {
        self.ensure_contains(child)?;
        let Ok(Parent(parent)) = self.world.remove_one::<Parent>(child) else {
            return Ok(());
        };
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.retain(|c| *c != child);
        }
        Ok(())
    }

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.world.get::<&Parent>(id).ok().map(|parent| parent.0)
    }

    pub fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.world
            .get::<&Children>(id)
            .map(|children| children.0.clone())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    pub fn transform(&self, id: ObjectId) -> Result<Transform> {
        self.world
            .get::<&Transform>(id)
            .map(|transform| *transform)
            .map_err(|_| EngineError::NoSuchObject)
    }

    pub fn transform_mut(&mut self, id: ObjectId) -> Result<hecs::RefMut<'_, Transform>> {
        self.world
            .get::<&mut Transform>(id)
            .map_err(|_| EngineError::NoSuchObject)
    }

    /// Recomputes world matrices and directions for every enabled object.
    pub fn update_transforms(&mut self) {
        transforms::propagate_transforms(&mut self.world);
    }

    /// `None` until the object took part in a transform pass.
    pub fn world_transform(&self, id: ObjectId) -> Option<WorldTransform> {
        self.world.get::<&WorldTransform>(id).ok().map(|wt| *wt)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attaches a component, replacing any component of the same kind.
    pub fn attach_component(&mut self, id: ObjectId, component: impl Into<Component>) -> Result<()> {
        let result = match component.into() {
            Component::Camera(camera) => self.world.insert_one(id, camera),
            Component::Light(light) => self.world.insert_one(id, light),
            Component::Mesh(mesh) => self.world.insert_one(id, mesh),
            Component::Sprite(sprite) => self.world.insert_one(id, sprite),
        };
        result.map_err(|_| EngineError::NoSuchObject)
    }

    pub fn detach_component(&mut self, id: ObjectId, kind: ComponentKind) -> Result<()> {
        self.ensure_contains(id)?;
        let _ = match kind {
            ComponentKind::Camera => self.world.remove_one::<CameraComponent>(id).map(drop),
            ComponentKind::Light => self.world.remove_one::<LightComponent>(id).map(drop),
            ComponentKind::Mesh => self.world.remove_one::<MeshComponent>(id).map(drop),
            ComponentKind::Sprite => self.world.remove_one::<SpriteComponent>(id).map(drop),
        };
        Ok(())
    }

    pub fn component<T: ComponentData>(&self, id: ObjectId) -> Option<hecs::Ref<'_, T>> {
        self.world.get::<&T>(id).ok()
    }

    pub fn component_mut<T: ComponentData>(&mut self, id: ObjectId) -> Option<hecs::RefMut<'_, T>> {
        self.world.get::<&mut T>(id).ok()
    }

    /// Snapshot of every component attached to `id`.
    pub fn components(&self, id: ObjectId) -> Vec<Component> {
        let mut components = Vec::new();
        if let Some(camera) = self.component::<CameraComponent>(id) {
            components.push((*camera).clone().into_component());
        }
        if let Some(light) = self.component::<LightComponent>(id) {
            components.push((*light).clone().into_component());
        }
        if let Some(mesh) = self.component::<MeshComponent>(id) {
            components.push((*mesh).clone().into_component());
        }
        if let Some(sprite) = self.component::<SpriteComponent>(id) {
            components.push((*sprite).clone().into_component());
        }
        components
    }

    // ------------------------------------------------------------------
    // Behaviors
    // ------------------------------------------------------------------

    pub fn set_behavior(&mut self, id: ObjectId, behavior: impl Behavior + 'static) -> Result<()> {
        self.ensure_contains(id)?;
        self.insert_behavior(id, Box::new(behavior));
        Ok(())
    }

    fn insert_behavior(&mut self, id: ObjectId, behavior: Box<dyn Behavior>) {
        match self.behaviors.iter_mut().find(|(object, _)| *object == id) {
            Some(slot) => slot.1 = behavior,
            None => self.behaviors.push((id, behavior)),
        }
    }

    pub fn has_behavior(&self, id: ObjectId) -> bool {
        self.behaviors.iter().any(|(object, _)| *object == id)
    }

    /// Calls `f` for the behavior of every enabled object. The behaviors are
    /// taken out of the scene for the duration so callbacks may mutate it.
    pub(crate) fn run_behaviors(&mut self, mut f: impl FnMut(&mut Scene, ObjectId, &mut dyn Behavior)) {
        let mut running = std::mem::take(&mut self.behaviors);
        for (object, behavior) in running.iter_mut() {
            if self.is_enabled(*object) {
                f(self, *object, behavior.as_mut());
            }
        }

        // Behaviors set during the callbacks win over the running ones.
        let added = std::mem::replace(&mut self.behaviors, running);
        self.behaviors.retain(|(object, _)| self.world.contains(*object));
        for (object, behavior) in added {
            self.insert_behavior(object, behavior);
        }
    }

    fn ensure_contains(&self, id: ObjectId) -> Result<()> {
        if self.world.contains(id) {
            Ok(())
        } else {
            Err(EngineError::NoSuchObject)
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects)
            .field("behaviors", &self.behaviors.len())
            .finish()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
