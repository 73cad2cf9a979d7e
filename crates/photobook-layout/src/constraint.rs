//! Confining objects to pages
//!
//! Every user object belongs to exactly one page of the current spread,
//! derived from where its bounding box sits:
//! - The page whose horizontal span contains the reference point owns it
//! - A locked page hands ownership to its sibling
//! - Objects over the gutter or off the spread go to the nearest editable page
//!
//! The reference point is the box center, except for boxes wider than a
//! page, where it is half a page width in from the left edge. Clamping an
//! object onto its owner therefore never changes its owner, so constraining
//! again (after a reload or a relayout) leaves it where it is.
//!
//! Ownership never crosses spreads.

use crate::layout::{Page, Rect, SpreadLayout};
use crate::scene::{ClipRegion, DrawableObject};

/// Page owning a bounding box.
///
/// Returns None only for a layout without editable pages, which the book
/// model never produces.
pub fn owner_page_for_bounds<'a>(layout: &'a SpreadLayout, bounds: &Rect) -> Option<&'a Page> {
    let center_x = reference_x(layout, bounds);

    if let Some(page) = layout.pages.iter().find(|p| p.rect.spans_x(center_x)) {
        if !page.locked {
            return Some(page);
        }
        let sibling = layout.page(page.side.sibling());
        if !sibling.locked {
            return Some(sibling);
        }
    }

    layout.editable_pages().min_by(|a, b| {
        a.rect
            .distance_x(center_x)
            .total_cmp(&b.rect.distance_x(center_x))
    })
}

/// Horizontal point deciding ownership
fn reference_x(layout: &SpreadLayout, bounds: &Rect) -> f32 {
    let page_width = layout.pages[0].rect.width.min(layout.pages[1].rect.width);
    bounds.x + bounds.width.min(page_width) / 2.0
}

pub fn owner_page<'a>(layout: &'a SpreadLayout, obj: &DrawableObject) -> Option<&'a Page> {
    owner_page_for_bounds(layout, &obj.bounding_box())
}

/// Clamp the object's top-left corner so its bounding box stays on `page`.
///
/// Objects larger than the page are anchored at the page origin.
pub fn constrain_to(obj: &mut DrawableObject, page: &Page) {
    let bounds = obj.bounding_box();
    let area = page.rect;

    let max_left = (area.right() - bounds.width).max(area.x);
    let max_top = (area.bottom() - bounds.height).max(area.y);
    let left = bounds.x.max(area.x).min(max_left);
    let top = bounds.y.max(area.y).min(max_top);

    obj.set_position(left, top);
}

/// Clamp the object onto its owner page
pub fn constrain(obj: &mut DrawableObject, layout: &SpreadLayout) {
    if let Some(page) = owner_page(layout, obj) {
        constrain_to(obj, page);
    }
}

/// Attach a clip region equal to the owner page's rectangle
pub fn reclip(obj: &mut DrawableObject, layout: &SpreadLayout) {
    obj.clip = owner_page(layout, obj).map(|page| ClipRegion::page(page.rect));
}

/// Constrain and clip against the owner page.
///
/// Afterwards `owner_page` resolves to the same page, so `apply` and
/// `reclip` agree and a second `apply` is a no-op.
pub fn apply(obj: &mut DrawableObject, layout: &SpreadLayout) {
    let Some(page) = owner_page(layout, obj).copied() else {
        obj.clip = None;
        return;
    };
    constrain_to(obj, &page);
    obj.clip = Some(ClipRegion::page(page.rect));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::layout::{Viewport, layout_spread};
    use crate::scene::{ObjectId, Transform};
    use crate::types::PageSide;
    use proptest::prelude::*;

    fn layout(index: usize) -> SpreadLayout {
        let book = Book::new(30).unwrap();
        layout_spread(book.spread(index).unwrap(), Viewport::default(), 1.0, None)
    }

    fn image_at(left: f32, top: f32, width: f32, height: f32) -> DrawableObject {
        DrawableObject::image(
            ObjectId::new("img"),
            Transform::at(left, top),
            width,
            height,
            None,
            "img.png",
        )
    }

    #[test]
    fn test_owner_by_center() {
        let layout = layout(2);
        let right = layout.page(PageSide::Right).rect;
        let obj = image_at(right.x + 5.0, right.y + 5.0, 20.0, 20.0);
        assert_eq!(owner_page(&layout, &obj).unwrap().side, PageSide::Right);
    }

    #[test]
    fn test_locked_page_redirects_to_right() {
        let layout = layout(1);
        let left = layout.page(PageSide::Left).rect;
        let mut obj = image_at(left.x + 10.0, left.y + 10.0, 40.0, 40.0);
        assert_eq!(owner_page(&layout, &obj).unwrap().side, PageSide::Right);

        apply(&mut obj, &layout);
        let right = layout.page(PageSide::Right).rect;
        assert!(right.contains_rect(&obj.bounding_box(), 0.001));
        assert_eq!(obj.clip.unwrap().rect, right);
    }

    #[test]
    fn test_gutter_object_goes_to_nearest_page() {
        let layout = layout(0);
        let left = layout.page(PageSide::Left).rect;
        // Center two pixels into the gutter, closer to the left page
        let obj = image_at(left.right() + 2.0 - 10.0, left.y, 20.0, 20.0);
        assert_eq!(owner_page(&layout, &obj).unwrap().side, PageSide::Left);
    }

    #[test]
    fn test_constrain_clamps_into_page() {
        let layout = layout(2);
        let right = layout.page(PageSide::Right).rect;
        let mut obj = image_at(right.right() - 10.0, right.bottom() - 10.0, 50.0, 50.0);
        // Center lies past the right edge: nearest page is still the right one
        apply(&mut obj, &layout);
        let bounds = obj.bounding_box();
        assert_eq!(bounds.right(), right.right());
        assert_eq!(bounds.bottom(), right.bottom());
    }

    #[test]
    fn test_oversized_object_anchors_at_origin() {
        let layout = layout(2);
        let left = layout.page(PageSide::Left).rect;
        let mut obj = image_at(left.x + 30.0, left.y + 30.0, left.width * 3.0, left.height * 3.0);
        let owner = owner_page(&layout, &obj).unwrap().side;
        apply(&mut obj, &layout);
        let page = layout.page(owner).rect;
        assert_eq!(obj.transform.left, page.x);
        assert_eq!(obj.transform.top, page.y);
        assert_eq!(obj.effective_bounds().unwrap(), page);
    }

    #[test]
    fn test_oversized_object_keeps_owner_after_anchoring() {
        let layout = layout(2);
        let left = layout.page(PageSide::Left).rect;
        // Box center lands on the right page once anchored at the left origin
        let mut obj = image_at(left.x - 300.0, left.y, left.width * 4.0, left.height * 0.5);
        apply(&mut obj, &layout);

        assert_eq!(obj.transform.left, left.x);
        let right = layout.page(PageSide::Right).rect;
        assert!(right.spans_x(obj.bounding_box().center_x()));
        assert_eq!(owner_page(&layout, &obj).unwrap().side, PageSide::Left);
        assert_eq!(obj.clip.unwrap().rect, left);

        let anchored = obj.clone();
        reclip(&mut obj, &layout);
        assert_eq!(obj, anchored);
        apply(&mut obj, &layout);
        assert_eq!(obj, anchored);
    }

    #[test]
    fn test_oversized_object_on_right_page_stays_right() {
        let layout = layout(2);
        let right = layout.page(PageSide::Right).rect;
        let mut obj = image_at(right.x + 40.0, right.y, right.width * 4.0, right.height * 4.0);
        apply(&mut obj, &layout);

        assert_eq!(obj.transform.left, right.x);
        assert_eq!(owner_page(&layout, &obj).unwrap().side, PageSide::Right);
        let anchored = obj.transform;
        apply(&mut obj, &layout);
        assert_eq!(obj.transform, anchored);
    }

    #[test]
    fn test_reclip_uses_absolute_non_interactive_clip() {
        let layout = layout(3);
        let left = layout.page(PageSide::Left).rect;
        let mut obj = image_at(left.x, left.y, 10.0, 10.0);
        reclip(&mut obj, &layout);
        let clip = obj.clip.unwrap();
        assert_eq!(clip.rect, left);
        assert!(clip.absolute);
        assert!(!clip.interactive);
    }

    proptest! {
        #[test]
        fn constrained_objects_stay_on_owner_page(
            spread in 0usize..4,
            left in -500.0f32..2000.0,
            top in -500.0f32..1500.0,
            width in 1.0f32..900.0,
            height in 1.0f32..900.0,
            scale_x in 0.05f32..6.0,
            scale_y in 0.05f32..6.0,
        ) {
            let layout = layout(spread);
            let mut obj = image_at(left, top, width, height);
            obj.set_scale(scale_x, scale_y, false);
            apply(&mut obj, &layout);

            let clip = obj.clip.expect("object is clipped");
            let owner = layout
                .pages
                .iter()
                .find(|p| p.rect == clip.rect)
                .expect("clip matches a page");
            prop_assert!(!owner.locked);
            let visible = obj.effective_bounds().expect("object overlaps its page");
            prop_assert!(owner.rect.contains_rect(&visible, 0.01));

            // Reloading re-applies the constraint; it must not move the object
            prop_assert_eq!(owner_page(&layout, &obj).map(|p| p.side), Some(owner.side));
            let settled = obj.clone();
            apply(&mut obj, &layout);
            prop_assert_eq!(&obj, &settled);
            reclip(&mut obj, &layout);
            prop_assert_eq!(&obj, &settled);
        }

        #[test]
        fn locked_page_never_owns(
            left in -500.0f32..2000.0,
            width in 1.0f32..900.0,
        ) {
            let layout = layout(1);
            let obj = image_at(left, 200.0, width, 40.0);
            let owner = owner_page(&layout, &obj).expect("spread 1 has an editable page");
            prop_assert_eq!(owner.side, PageSide::Right);
        }
    }
}
