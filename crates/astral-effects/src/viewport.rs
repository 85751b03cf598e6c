//! Host-supplied viewport and scroll inputs.
//!
//! Effects never read window size or scroll position on their own; the host
//! passes a [`Viewport`] each time it changes, along with section offsets
//! when it wants the navigation highlight.

/// Viewport width below which a layout counts as narrow (mobile).
pub const NARROW_VIEWPORT_PX: u32 = 768;
/// Scroll distance after which the navigation bar switches to its solid style.
pub const NAV_SCROLL_THRESHOLD_PX: f32 = 50.0;
/// Hero content travel at full scroll progress, in pixels (upwards).
pub const HERO_PARALLAX_TRAVEL_PX: f32 = -100.0;
/// Scroll progress at which the hero is fully faded out.
pub const HERO_FADE_END: f32 = 0.8;
/// A section becomes active this far before its top reaches the viewport top.
pub const SECTION_LOOKAHEAD_PX: f32 = 100.0;
/// Page sections in document order, as highlighted by the navigation bar.
pub const SECTIONS: [&str; 6] = ["home", "about", "gallery", "team", "events", "contact"];

/// Viewport dimensions and scroll offset in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
    /// Vertical scroll offset from the top of the page.
    pub scroll_y: f32,
}

impl Viewport {
    /// Viewport at the top of the page.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    /// Same viewport scrolled to `scroll_y`.
    pub fn scrolled_to(self, scroll_y: f32) -> Self {
        Self { scroll_y, ..self }
    }

    /// Returns `true` if the width is below `threshold_px`.
    pub fn is_narrow(&self, threshold_px: u32) -> bool {
        self.width < threshold_px
    }

    /// Returns `true` once the page has scrolled past the nav threshold.
    pub fn nav_scrolled(&self) -> bool {
        self.scroll_y > NAV_SCROLL_THRESHOLD_PX
    }
}

/// Index of the section the navigation should highlight.
///
/// `section_offsets` holds each section's top offset in document order. The
/// active section is the last one whose top offset is no greater than
/// `scroll_y + SECTION_LOOKAHEAD_PX`. Returns `None` when no section has been
/// reached, in which case the host keeps its previous highlight.
pub fn active_section(section_offsets: &[f32], scroll_y: f32) -> Option<usize> {
    let position = scroll_y + SECTION_LOOKAHEAD_PX;
    section_offsets.iter().rposition(|&top| position >= top)
}

impl Viewport {
    /// [`active_section`] at this viewport's scroll offset.
    pub fn active_section(&self, section_offsets: &[f32]) -> Option<usize> {
        active_section(section_offsets, self.scroll_y)
    }
}

/// Hero section transform for a scroll progress through the hero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeroParallax {
    /// Vertical offset in pixels (negative is up).
    pub offset_y: f32,
    /// Content opacity in [0, 1].
    pub opacity: f32,
}

/// Map hero scroll progress (0 at the top, 1 once scrolled past) to its
/// parallax offset and fade.
pub fn hero_parallax(scroll_progress: f32) -> HeroParallax {
    let p = scroll_progress.clamp(0.0, 1.0);
    HeroParallax {
        offset_y: p * HERO_PARALLAX_TRAVEL_PX,
        opacity: 1.0 - (p / HERO_FADE_END).min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_threshold_is_exclusive() {
        assert!(Viewport::new(767, 1024).is_narrow(NARROW_VIEWPORT_PX));
        assert!(!Viewport::new(768, 1024).is_narrow(NARROW_VIEWPORT_PX));
    }

    #[test]
    fn test_nav_scrolled() {
        let vp = Viewport::new(1280, 720);
        assert!(!vp.nav_scrolled());
        assert!(!vp.scrolled_to(50.0).nav_scrolled());
        assert!(vp.scrolled_to(50.5).nav_scrolled());
    }

    const OFFSETS: [f32; 6] = [0.0, 800.0, 1600.0, 2600.0, 3400.0, 4300.0];

    #[test]
    fn test_active_section_at_top_of_page() {
        assert_eq!(active_section(&OFFSETS, 0.0), Some(0));
        assert_eq!(SECTIONS[0], "home");
    }

    #[test]
    fn test_active_section_exact_boundary() {
        assert_eq!(active_section(&OFFSETS, 699.0), Some(0));
        assert_eq!(active_section(&OFFSETS, 700.0), Some(1), "lookahead reaches 'about' exactly");
        let vp = Viewport::new(1280, 720).scrolled_to(1500.0);
        assert_eq!(vp.active_section(&OFFSETS).map(|i| SECTIONS[i]), Some("gallery"));
    }

    #[test]
    fn test_active_section_past_last_section() {
        assert_eq!(active_section(&OFFSETS, 9000.0), Some(5));
        assert_eq!(SECTIONS[5], "contact");
    }

    #[test]
    fn test_active_section_none_before_first() {
        assert_eq!(active_section(&[250.0, 900.0], 100.0), None);
        assert_eq!(active_section(&[], 500.0), None);
    }

    #[test]
    fn test_hero_parallax_endpoints() {
        assert_eq!(
            hero_parallax(0.0),
            HeroParallax {
                offset_y: 0.0,
                opacity: 1.0
            }
        );
        let end = hero_parallax(1.0);
        assert_eq!(end.offset_y, -100.0);
        assert_eq!(end.opacity, 0.0);
    }

    #[test]
    fn test_hero_fades_before_travel_ends() {
        let at_fade_end = hero_parallax(HERO_FADE_END);
        assert!(at_fade_end.opacity.abs() < 1e-6);
        assert!((at_fade_end.offset_y + 80.0).abs() < 1e-4);
        let mid = hero_parallax(0.4);
        assert!((mid.opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hero_parallax_clamps_input() {
        assert_eq!(hero_parallax(-1.0), hero_parallax(0.0));
        assert_eq!(hero_parallax(3.0), hero_parallax(1.0));
    }
}
