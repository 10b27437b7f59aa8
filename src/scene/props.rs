use crate::scene::surface::PropKey;
use glam::Vec2;
use std::collections::HashMap;

/// A placeable token on the scene. `image_ref` names an image by
/// reference; the scene never owns or loads image data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub key: PropKey,
    pub image_ref: String,
    pub position: Vec2,
}

/// The props of one scene, keyed by a counter so keys stay unique for
/// the scene's lifetime even after removals.
#[derive(Debug, Default)]
pub struct PropSet {
    props: HashMap<PropKey, Prop>,
    next_key: PropKey,
}

impl PropSet {
    pub fn insert(&mut self, image_ref: &str, position: Vec2) -> PropKey {
        let key = self.next_key;
        self.next_key += 1;
        self.props.insert(
            key,
            Prop {
                key,
                image_ref: image_ref.to_string(),
                position,
            },
        );
        key
    }

    pub fn get(&self, key: PropKey) -> Option<&Prop> {
        self.props.get(&key)
    }

    pub fn get_mut(&mut self, key: PropKey) -> Option<&mut Prop> {
        self.props.get_mut(&key)
    }

    pub fn remove(&mut self, key: PropKey) -> Option<Prop> {
        self.props.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prop> {
        self.props.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_never_reused() {
        let mut props = PropSet::default();
        let first = props.insert("goblin.png", Vec2::ZERO);
        props.remove(first);
        let second = props.insert("goblin.png", Vec2::ZERO);
        assert_ne!(first, second);
    }

    #[test]
    fn removal_is_idempotent() {
        let mut props = PropSet::default();
        let key = props.insert("hero.png", Vec2::new(10.0, 20.0));
        assert!(props.remove(key).is_some());
        assert!(props.remove(key).is_none());
        assert!(props.is_empty());
    }
}
