//=========================================================================
// Views
//=========================================================================
//
// A view is a camera: a rectangle of the room shown at a port (a
// rectangle of the window). A room may have several views, e.g. for
// split-screen.
//
// Views are kept inside their room; moving one past an edge clamps it
// back.
//
//=========================================================================

//=== View ================================================================

/// A rectangle of the room drawn to a rectangle of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    x: f64,
    y: f64,
    width: Option<f64>,
    height: Option<f64>,

    /// Left edge of the port on the window.
    pub xport: f64,

    /// Top edge of the port on the window.
    pub yport: f64,

    wport: Option<f64>,
    hport: Option<f64>,

    /// Size of the room the view is clamped to.
    bounds: Option<(f64, f64)>,
}

impl View {
    /// A view at `(x, y)` in the room, shown at the window's top-left
    /// corner. Width and height default to the window size.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            width: None,
            height: None,
            xport: 0.0,
            yport: 0.0,
            wport: None,
            hport: None,
            bounds: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self.limit();
        self
    }

    pub fn with_port(mut self, xport: f64, yport: f64) -> Self {
        self.xport = xport;
        self.yport = yport;
        self
    }

    /// Scales the view to a port of a different size.
    pub fn with_port_size(mut self, wport: f64, hport: f64) -> Self {
        self.wport = Some(wport);
        self.hport = Some(hport);
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
        self.limit();
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
        self.limit();
    }

    /// Width in room pixels. `0.0` until the view is sized or added to
    /// a running game.
    pub fn width(&self) -> f64 {
        self.width.unwrap_or(0.0)
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = Some(width);
        self.limit();
    }

    pub fn height(&self) -> f64 {
        self.height.unwrap_or(0.0)
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = Some(height);
        self.limit();
    }

    /// Width of the port; the view's width unless set.
    pub fn wport(&self) -> f64 {
        self.wport.unwrap_or_else(|| self.width())
    }

    pub fn set_wport(&mut self, wport: Option<f64>) {
        self.wport = wport;
    }

    pub fn hport(&self) -> f64 {
        self.hport.unwrap_or_else(|| self.height())
    }

    pub fn set_hport(&mut self, hport: Option<f64>) {
        self.hport = hport;
    }

    //--- Room Binding -----------------------------------------------------

    /// Fills an unset size from the window size minus the port offset.
    pub(crate) fn resolve(&mut self, game_width: f64, game_height: f64) {
        if self.width.is_none() {
            self.width = Some(game_width - self.xport);
        }
        if self.height.is_none() {
            self.height = Some(game_height - self.yport);
        }
        self.limit();
    }

    pub(crate) fn set_bounds(&mut self, room_width: f64, room_height: f64) {
        self.bounds = Some((room_width, room_height));
        self.limit();
    }

    /// Keeps the view inside the room.
    fn limit(&mut self) {
        let Some((room_w, room_h)) = self.bounds else {
            return;
        };
        let (w, h) = (self.width(), self.height());
        if self.x < 0.0 {
            self.x = 0.0;
        } else if self.x + w > room_w {
            self.x = room_w - w;
        }
        if self.y < 0.0 {
            self.y = 0.0;
        } else if self.y + h > room_h {
            self.y = room_h - h;
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fills_size_from_window() {
        let mut view = View::new(0.0, 0.0).with_port(40.0, 0.0);
        view.resolve(640.0, 480.0);
        assert_eq!((view.width(), view.height()), (600.0, 480.0));
        assert_eq!((view.wport(), view.hport()), (600.0, 480.0));
    }

    #[test]
    fn explicit_port_size_is_kept() {
        let view = View::new(0.0, 0.0).with_size(100.0, 50.0).with_port_size(200.0, 100.0);
        assert_eq!((view.wport(), view.hport()), (200.0, 100.0));
    }

    #[test]
    fn view_stays_inside_room() {
        let mut view = View::new(0.0, 0.0).with_size(100.0, 100.0);
        view.set_bounds(300.0, 200.0);

        view.set_x(-10.0);
        assert_eq!(view.x(), 0.0);
        view.set_x(250.0);
        assert_eq!(view.x(), 200.0);
        view.set_y(150.0);
        assert_eq!(view.y(), 100.0);
        view.set_y(40.0);
        assert_eq!(view.y(), 40.0);
    }

    #[test]
    fn unbound_view_moves_freely() {
        let mut view = View::new(0.0, 0.0).with_size(10.0, 10.0);
        view.set_x(-50.0);
        assert_eq!(view.x(), -50.0);
    }
}
