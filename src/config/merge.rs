//! Layering of several base documents

use crate::domain::ConfigNode;

/// Merge `layer` over `base`.
///
/// Mappings merge key by key; lists and scalars are replaced wholesale. A `???`
/// in a later layer never erases a value an earlier layer already set.
pub fn deep_merge(base: &mut ConfigNode, layer: ConfigNode) {
    match (base, layer) {
        (ConfigNode::Map(base_map), ConfigNode::Map(layer_map)) => {
            for (key, value) in layer_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (_, ConfigNode::Missing) => {}
        (slot, value) => *slot = value,
    }
}
