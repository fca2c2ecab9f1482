//! Screens of the 16x2 character display.
//!
//! Every paint rewrites whole rows, padding them with spaces, so the
//! display is cleared only when switching to another screen.

use core::fmt::{self, Write};

use heapless::String;

use crate::menu::{Menu, Mode};
use crate::peripherals::{Display, Glyph};
use crate::regulation::Readings;
use crate::setpoint::Editor;
use crate::unit::{Quantity, Unit};

pub const COLUMNS: u8 = 16;
pub const ROWS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    Splash,
    Menu,
    Edit,
    Run,
}

impl From<Mode> for Screen {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Idle { .. } => Self::Menu,
            Mode::Edit { .. } => Self::Edit,
            Mode::Run { .. } => Self::Run,
        }
    }
}

/// Painter remembering which screen is on the display.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Renderer {
    painted: Option<Screen>,
}

impl Renderer {
    /// Forget what is on the display, the next paint starts by clearing it.
    pub fn invalidate(&mut self) {
        self.painted = None;
    }

    /// # Errors
    ///
    /// Passes through the failure of the display.
    pub fn paint_splash<D: Display>(&mut self, display: &mut D) -> Result<(), D::Error> {
        self.prepare(display, Screen::Splash)?;
        Line::start(display, 0)?.text("Electronic Load")?.finish()?;
        Line::start(display, 1)?
            .format(format_args!("v{}", env!("CARGO_PKG_VERSION")))?
            .finish()
    }

    /// Paint the screen of the menu's current mode.
    ///
    /// # Errors
    ///
    /// Passes through the failure of the display.
    pub fn paint<D: Display>(
        &mut self,
        display: &mut D,
        menu: &Menu,
        readings: Option<&Readings>,
    ) -> Result<(), D::Error> {
        let mode = menu.mode();
        self.prepare(display, Screen::from(mode))?;
        match mode {
            Mode::Idle { highlighted } => paint_menu(display, menu.units(), highlighted),
            Mode::Edit { unit } => paint_edit(display, &menu.units()[unit], menu.editor()),
            Mode::Run { unit } => paint_run(
                display,
                &menu.units()[unit],
                menu.setpoint(unit).unwrap_or(0),
                readings,
                menu.paused(),
            ),
        }
    }

    fn prepare<D: Display>(&mut self, display: &mut D, screen: Screen) -> Result<(), D::Error> {
        if self.painted != Some(screen) {
            self.painted = None;
            display.clear()?;
            self.painted = Some(screen);
        }
        Ok(())
    }
}

fn paint_menu<D: Display>(
    display: &mut D,
    units: &[Unit],
    highlighted: usize,
) -> Result<(), D::Error> {
    let first = highlighted.saturating_sub(ROWS as usize - 1);
    for row in 0..ROWS {
        let index = first + row as usize;
        let mut line = Line::start(display, row)?;
        line = if index == highlighted {
            line.glyph(Glyph::Arrow)?
        } else {
            line.text(" ")?
        };
        if let Some(unit) = units.get(index) {
            line = line.text(unit.label)?;
        }
        line.finish()?;
    }
    Ok(())
}

fn paint_edit<D: Display>(display: &mut D, unit: &Unit, editor: &Editor) -> Result<(), D::Error> {
    let mut place: String<8> = String::new();
    let _ = write!(place, "{}/{}", editor.cursor() + 1, editor.digits().len());
    Line::start(display, 0)?
        .text(unit.label)?
        .pad_to(COLUMNS - place.len() as u8)?
        .text(&place)?
        .finish()?;

    let mut digits: String<{ crate::unit::MAX_DIGITS }> = String::new();
    for digit in editor.digits() {
        let _ = digits.push(char::from(b'0' + digit));
    }
    Line::start(display, 1)?
        .text(&digits)?
        .unit(unit)?
        .pad_to(COLUMNS - 1)?
        .glyph(Glyph::Adjust)?
        .finish()
}

fn paint_run<D: Display>(
    display: &mut D,
    unit: &Unit,
    setpoint: u32,
    readings: Option<&Readings>,
    paused: bool,
) -> Result<(), D::Error> {
    let line = Line::start(display, 0)?
        .format(format_args!("Set:{setpoint}"))?
        .unit(unit)?
        .pad_to(COLUMNS - 1)?;
    if paused {
        line.glyph(Glyph::Pause)?.finish()?;
    } else {
        line.finish()?;
    }

    let line = Line::start(display, 1)?;
    let Some(readings) = readings else {
        return line.text("---")?.finish();
    };
    let line = match unit.quantity {
        Quantity::Current => line.format(format_args!("{:.0}mA", readings.current * 1000.0))?,
        Quantity::Power => match readings.power() {
            Some(power) => line.format(format_args!("{:.0}mW", power * 1000.0))?,
            None => line.text("---")?,
        },
        Quantity::Resistance => match readings.resistance() {
            Some(resistance) => line
                .format(format_args!("{resistance:.0}"))?
                .glyph(Glyph::Ohm)?,
            None => line.text("---")?,
        },
    };
    match readings.voltage {
        Some(voltage) => line.format(format_args!(" {voltage:.3}V"))?.finish(),
        None => line.finish(),
    }
}

/// Writer of a single display row keeping track of the column.
///
/// Text beyond the last column is cut off.
struct Line<'d, D: Display> {
    display: &'d mut D,
    col: u8,
}

impl<'d, D: Display> Line<'d, D> {
    fn start(display: &'d mut D, row: u8) -> Result<Self, D::Error> {
        display.set_cursor(0, row)?;
        Ok(Self { display, col: 0 })
    }

    fn text(mut self, text: &str) -> Result<Self, D::Error> {
        let room = COLUMNS.saturating_sub(self.col) as usize;
        let end = text.char_indices().nth(room).map_or(text.len(), |(i, _)| i);
        let text = &text[..end];
        if !text.is_empty() {
            self.display.print(text)?;
            self.col = self.col.saturating_add(text.chars().count() as u8);
        }
        Ok(self)
    }

    fn format(self, args: fmt::Arguments) -> Result<Self, D::Error> {
        let mut text: String<24> = String::new();
        // NOTE: Overflowing text would be cut off by the row anyway.
        let _ = text.write_fmt(args);
        self.text(&text)
    }

    fn glyph(mut self, glyph: Glyph) -> Result<Self, D::Error> {
        if self.col < COLUMNS {
            self.display.write_glyph(glyph)?;
            self.col += 1;
        }
        Ok(self)
    }

    fn unit(self, unit: &Unit) -> Result<Self, D::Error> {
        let line = self.text(unit.suffix)?;
        match unit.glyph {
            Some(glyph) => line.glyph(glyph),
            None => Ok(line),
        }
    }

    fn pad_to(mut self, col: u8) -> Result<Self, D::Error> {
        const SPACES: &str = "                ";
        let col = col.min(COLUMNS);
        if col > self.col {
            let width = (col - self.col) as usize;
            self = self.text(&SPACES[..width])?;
        }
        Ok(self)
    }

    fn finish(self) -> Result<(), D::Error> {
        self.pad_to(COLUMNS).map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::input::button::Edge;
    use crate::input::encoder::Direction;
    use crate::input::snapshot::Snapshot;
    use crate::unit::UNITS;

    /// Display keeping the characters in memory, glyphs are shown as `#id`.
    #[derive(Debug)]
    pub(crate) struct FakeDisplay {
        pub rows: [[char; COLUMNS as usize]; ROWS as usize],
        pub glyphs: [[Option<Glyph>; COLUMNS as usize]; ROWS as usize],
        pub clears: usize,
        pub paints: usize,
        cursor: (usize, usize),
    }

    impl Default for FakeDisplay {
        fn default() -> Self {
            Self {
                rows: [[' '; COLUMNS as usize]; ROWS as usize],
                glyphs: [[None; COLUMNS as usize]; ROWS as usize],
                clears: 0,
                paints: 0,
                cursor: (0, 0),
            }
        }
    }

    impl FakeDisplay {
        pub fn row(&self, row: usize) -> std::string::String {
            self.rows[row].iter().collect()
        }

        fn put(&mut self, c: char, glyph: Option<Glyph>) {
            let (col, row) = self.cursor;
            assert!(col < COLUMNS as usize, "Writing beyond the last column");
            self.rows[row][col] = c;
            self.glyphs[row][col] = glyph;
            self.cursor.0 += 1;
        }
    }

    impl Display for FakeDisplay {
        type Error = ();

        fn clear(&mut self) -> Result<(), ()> {
            *self = Self {
                clears: self.clears + 1,
                paints: self.paints,
                ..Self::default()
            };
            Ok(())
        }

        fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), ()> {
            if row == 0 {
                self.paints += 1;
            }
            self.cursor = (col as usize, row as usize);
            Ok(())
        }

        fn print(&mut self, text: &str) -> Result<(), ()> {
            for c in text.chars() {
                self.put(c, None);
            }
            Ok(())
        }

        fn write_glyph(&mut self, glyph: Glyph) -> Result<(), ()> {
            self.put('#', Some(glyph));
            Ok(())
        }
    }

    fn press(menu: &mut Menu, turns: &[(Direction, usize)]) {
        for (direction, count) in turns {
            for _ in 0..*count {
                menu.apply(&Snapshot {
                    turn: Some(*direction),
                    ..Snapshot::default()
                });
            }
            menu.apply(&Snapshot {
                confirm: Edge::Pressed,
                ..Snapshot::default()
            });
        }
    }

    #[test]
    fn menu_screen_marks_highlighted_unit() {
        let menu = Menu::new(&UNITS);
        let mut display = FakeDisplay::default();
        Renderer::default().paint(&mut display, &menu, None).unwrap();
        assert_eq!(display.row(0), "#Resistance     ");
        assert_eq!(display.row(1), " Current        ");
        assert_eq!(display.glyphs[0][0], Some(Glyph::Arrow));
    }

    #[test]
    fn menu_screen_scrolls_to_keep_highlight_visible() {
        let mut menu = Menu::new(&UNITS);
        for _ in 0..2 {
            menu.apply(&Snapshot {
                turn: Some(Direction::Down),
                ..Snapshot::default()
            });
        }
        let mut display = FakeDisplay::default();
        Renderer::default().paint(&mut display, &menu, None).unwrap();
        assert_eq!(display.row(0), " Current        ");
        assert_eq!(display.row(1), "#Power          ");
    }

    #[test]
    fn edit_screen_shows_all_digits_and_cursor_place() {
        let mut menu = Menu::new(&UNITS);
        press(&mut menu, &[(Direction::Up, 0), (Direction::Up, 1)]);
        let mut display = FakeDisplay::default();
        Renderer::default().paint(&mut display, &menu, None).unwrap();
        assert_eq!(display.row(0), "Resistance   2/7");
        assert_eq!(display.row(1), "1000000#       #");
        assert_eq!(display.glyphs[1][7], Some(Glyph::Ohm));
        assert_eq!(display.glyphs[1][15], Some(Glyph::Adjust));
    }

    #[test]
    fn run_screen_shows_setpoint_and_sensed_values_per_unit() {
        let mut menu = Menu::new(&UNITS);
        press(
            &mut menu,
            &[
                (Direction::Down, 1),
                (Direction::Up, 0),
                (Direction::Up, 5),
                (Direction::Up, 0),
                (Direction::Up, 0),
            ],
        );
        let readings = Readings {
            current: 0.498,
            voltage: None,
        };
        let mut display = FakeDisplay::default();
        Renderer::default()
            .paint(&mut display, &menu, Some(&readings))
            .unwrap();
        assert_eq!(display.row(0), "Set:500mA       ");
        assert_eq!(display.row(1), "498mA           ");
    }

    #[test]
    fn run_screen_shows_voltage_with_three_decimals() {
        let mut menu = Menu::new(&UNITS);
        press(
            &mut menu,
            &[
                (Direction::Down, 2),
                (Direction::Up, 0),
                (Direction::Up, 6),
                (Direction::Up, 0),
                (Direction::Up, 0),
                (Direction::Up, 0),
            ],
        );
        menu.apply(&Snapshot {
            pause: Edge::Pressed,
            ..Snapshot::default()
        });
        let readings = Readings {
            current: 0.5,
            voltage: Some(12.0),
        };
        let mut display = FakeDisplay::default();
        Renderer::default()
            .paint(&mut display, &menu, Some(&readings))
            .unwrap();
        assert_eq!(display.row(0), "Set:6000mW     #");
        assert_eq!(display.glyphs[0][15], Some(Glyph::Pause));
        assert_eq!(display.row(1), "6000mW 12.000V  ");
    }

    #[test]
    fn run_screen_in_resistance_shows_ohms() {
        let mut menu = Menu::new(&UNITS);
        press(
            &mut menu,
            &[
                (Direction::Up, 0),
                (Direction::Up, 0),
                (Direction::Up, 0),
                (Direction::Up, 0),
                (Direction::Up, 0),
                (Direction::Up, 0),
                (Direction::Up, 2),
                (Direction::Up, 4),
            ],
        );
        let readings = Readings {
            current: 0.5,
            voltage: Some(12.0),
        };
        let mut display = FakeDisplay::default();
        Renderer::default()
            .paint(&mut display, &menu, Some(&readings))
            .unwrap();
        assert_eq!(display.row(0), "Set:24#         ");
        assert_eq!(display.row(1), "24# 12.000V     ");
        assert_eq!(display.glyphs[1][2], Some(Glyph::Ohm));
    }

    #[test]
    fn when_same_screen_is_repainted_it_is_not_cleared() {
        let mut menu = Menu::new(&UNITS);
        let mut renderer = Renderer::default();
        let mut display = FakeDisplay::default();
        renderer.paint(&mut display, &menu, None).unwrap();
        renderer.paint(&mut display, &menu, None).unwrap();
        assert_eq!(display.clears, 1);

        press(&mut menu, &[(Direction::Up, 0)]);
        renderer.paint(&mut display, &menu, None).unwrap();
        assert_eq!(display.clears, 2);

        renderer.invalidate();
        renderer.paint(&mut display, &menu, None).unwrap();
        assert_eq!(display.clears, 3);
    }

    #[test]
    fn when_text_overflows_the_row_it_is_cut_at_a_character() {
        let mut display = FakeDisplay::default();
        Line::start(&mut display, 0)
            .unwrap()
            .text("Load µA")
            .unwrap()
            .text("0123456µ9")
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(display.row(0), "Load µA0123456µ9");

        Line::start(&mut display, 1)
            .unwrap()
            .text("0123456789abcde")
            .unwrap()
            .text("µµ")
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(display.row(1), "0123456789abcdeµ");
    }

    #[test]
    fn splash_screen_shows_name_and_version() {
        let mut display = FakeDisplay::default();
        Renderer::default().paint_splash(&mut display).unwrap();
        assert_eq!(display.row(0), "Electronic Load ");
        assert!(display.row(1).starts_with('v'));
    }
}
