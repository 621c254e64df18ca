use guarded_csprng::driver::{DisplaySurface, MemorySurface};

#[test]
fn test_memory_surface_accessors() {
    let mut surface = MemorySurface::new(Some(480.0), Some(8.0)).with_text("seed me");

    assert_eq!(surface.text().as_deref(), Some("seed me"));
    assert_eq!(surface.viewport_width_px(), Some(480.0));
    assert_eq!(surface.char_width_px(), Some(8.0));
    assert_eq!(surface.writes(), 0);

    surface.set_text("00 FF ".to_string());
    assert_eq!(surface.current_text(), "00 FF ");
    assert_eq!(surface.writes(), 1);
}

#[test]
fn test_default_surface_has_no_geometry() {
    let surface = MemorySurface::default();
    assert_eq!(surface.viewport_width_px(), None);
    assert_eq!(surface.char_width_px(), None);
    assert_eq!(surface.text().as_deref(), Some(""));
}
