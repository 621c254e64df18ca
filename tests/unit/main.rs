mod test_render;
mod test_surface;
