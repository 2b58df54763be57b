//! Display collaborator: the text-rendering surface the session engine
//! reports to, plus the colours, text styles, and menu tables it uses.
//!
//! The engine never paints pixels itself; an implementation maps these calls
//! onto its panel driver (ST7735 or similar, 160x128, RGB565).

/// RGB565 colour from 8-bit channels.
pub const fn colour565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

pub const BLACK: u16 = 0x0000;
pub const WHITE: u16 = 0xFFFF;
/// Menu and data-area background.
pub const MENU_BG_COLOUR: u16 = colour565(0, 0, 10);
/// Decoded results and status texts.
pub const MENU_DATA_TEXT_COLOUR: u16 = colour565(255, 0, 0);

/// Foreground/background colours, glyph scale, and wrap column of a text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub fg: u16,
    pub bg: u16,
    pub size: u8,
    /// Characters per line before wrapping; 0 disables wrapping.
    pub wrap: u16,
}

impl TextStyle {
    pub const fn new(fg: u16, bg: u16, size: u8, wrap: u16) -> Self {
        Self { fg, bg, size, wrap }
    }

    /// Same style wrapping after `wrap` characters.
    pub const fn wrapped(self, wrap: u16) -> Self {
        Self { wrap, ..self }
    }
}

/// Data text (red on black) wrapping after 20 characters.
pub const DATA_TEXT: TextStyle = TextStyle::new(MENU_DATA_TEXT_COLOUR, BLACK, 1, 20);
/// Data text without wrapping.
pub const STATUS_TEXT: TextStyle = TextStyle::new(MENU_DATA_TEXT_COLOUR, BLACK, 1, 0);
/// White titles and values (VIN, freeze-frame DTC, bus errors).
pub const WHITE_TEXT: TextStyle = TextStyle::new(WHITE, BLACK, 1, 0);

/// Menu pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuPage {
    /// ECU role selection, shown at start-up.
    #[default]
    Ecu,
    /// Diagnostic service selection.
    Services,
}

impl MenuPage {
    /// Item texts in cursor order.
    pub const fn items(self) -> &'static [&'static str] {
        match self {
            MenuPage::Ecu => &ECU_MENU_ITEMS,
            MenuPage::Services => &SERVICE_MENU_ITEMS,
        }
    }
}

pub const ECU_MENU_ITEMS: [&str; 3] = ["ECM - ID: 0x7E0", "TCM - ID: 0x7E1", "ABS - ID: 0x7E2"];

pub const SERVICE_MENU_ITEMS: [&str; 6] = [
    "Vehicle information",
    "Read codes (DTC)",
    "Erase codes",
    "View freeze frame",
    "Live all data",
    "DTCs during driving cycle",
];

/// Text-rendering surface.
pub trait Display {
    /// Fill the whole screen with the background colour.
    fn clear(&mut self);
    /// Fill a rectangle (used to blank one live-data value).
    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, colour: u16);
    fn draw_text(&mut self, x: i16, y: i16, text: &str, style: TextStyle);
    fn draw_char(&mut self, x: i16, y: i16, c: char, style: TextStyle);
    /// Draw `page` with the item at `cursor` highlighted.
    fn draw_menu(&mut self, page: MenuPage, cursor: u16);
}

//==================================================================================SCREEN_TEXTS
/// Fixed texts and their positions.
pub mod texts {
    pub const NO_DTCS_STORED: &str = "0 DTCs stored";
    pub const DTCS_CLEARED: &str = "DTCs correctly cleared\n\n     MIL Status: OFF\n";
    pub const ERROR_CLEARING: &str = "Error clearing DTCs\n\n        MIL Status: ON\n";
    pub const NO_DTCS_TO_CLEAR: &str = "There is not DTCs\n\n    MIL Status: OFF";
    pub const MODE_NOT_IMPLEMENTED: &str = "Mode not implemented           on this ECU";
    pub const VIN_TITLE: &str = "VIN";
    pub const FREEZE_FRAME_CAUSE: &str =
        "is the DTC that \n caused required freeze \n  frame data storage";
    pub const NO_FREEZE_FRAME: &str = "No freeze frame data   are stored";
    pub const TRANSMISSION_ERROR: &str = "Error decoding DTCs due to transmission error";
    pub const RECEPTION_ERROR: &str = "Error decoding DTCs due to reception error";

    /// Left edge of a DTC row; each character advances by [`DTC_CHAR_STEP`].
    pub const DTC_ROW_X: i16 = 10;
    pub const DTC_CHAR_STEP: i16 = 10;
    /// Top of the first DTC row; rows are [`DTC_ROW_STEP`] apart.
    pub const DTC_ROW_Y: i16 = 10;
    pub const DTC_ROW_STEP: i16 = 20;

    /// Live-data label column, value column, and value blanking size.
    pub const LIVE_LABEL_X: i16 = 5;
    pub const LIVE_VALUE_X: i16 = 120;
    pub const LIVE_ROW_Y: i16 = 5;
    pub const LIVE_ROW_STEP: i16 = 10;
    pub const LIVE_VALUE_WIDTH: i16 = 40;

    /// Screen row of a live-data entry.
    pub const fn live_row_y(row: usize) -> i16 {
        LIVE_ROW_Y + LIVE_ROW_STEP * row as i16
    }

    /// Screen row of the `index`-th DTC.
    pub const fn dtc_row_y(index: usize) -> i16 {
        DTC_ROW_Y + DTC_ROW_STEP * index as i16
    }
}
