use super::super::document::{AreaDocument, ItemDocument};
use super::errors::NodePath;

/// An item of the document tree together with its full path.
pub(crate) struct FlatItem<'a> {
    pub(crate) path: NodePath,
    pub(crate) item: &'a ItemDocument,
}

/// Depth-first flattening: an area's own items, then each of its sub-areas in order.
pub(crate) fn flatten_items(areas: &[AreaDocument]) -> Vec<FlatItem<'_>> {
    let mut flat = Vec::new();
    collect_items(areas, &NodePath::structure(), "areas", &mut flat);
    flat
}

fn collect_items<'a>(
    areas: &'a [AreaDocument],
    parent: &NodePath,
    segment: &str,
    flat: &mut Vec<FlatItem<'a>>,
) {
    for (index, area) in areas.iter().enumerate() {
        let path = parent.child(segment, index);
        for (item_index, item) in area.items.iter().enumerate() {
            flat.push(FlatItem {
                path: path.child("items", item_index),
                item,
            });
        }
        collect_items(&area.sub_areas, &path, "sub_areas", flat);
    }
}

/// Visits every area of the tree, parents before their sub-areas.
pub(crate) fn visit_areas<F>(areas: &[AreaDocument], visit: &mut F)
where
    F: FnMut(&NodePath, &AreaDocument),
{
    visit_level(areas, &NodePath::structure(), "areas", visit);
}

fn visit_level<F>(areas: &[AreaDocument], parent: &NodePath, segment: &str, visit: &mut F)
where
    F: FnMut(&NodePath, &AreaDocument),
{
    for (index, area) in areas.iter().enumerate() {
        let path = parent.child(segment, index);
        visit(&path, area);
        visit_level(&area.sub_areas, &path, "sub_areas", visit);
    }
}
