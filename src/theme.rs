use catppuccin::PALETTE;
use ratatui::style::Color;

const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used by the dashboard, taken from one Catppuccin flavor.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    base: Color,
    surface1: Color,
    overlay0: Color,
    overlay1: Color,
    text: Color,
    subtext0: Color,
    mauve: Color,
    red: Color,
    peach: Color,
    yellow: Color,
    green: Color,
    lavender: Color,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            surface1: catppuccin_to_color(&c.surface1),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            lavender: catppuccin_to_color(&c.lavender),
        }
    }

    #[must_use]
    pub const fn base(&self) -> Color {
        self.base
    }

    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    /// Secondary text such as version ranges.
    #[must_use]
    pub const fn muted(&self) -> Color {
        self.subtext0
    }

    /// Everything belonging to an unfocused pane.
    #[must_use]
    pub const fn dimmed(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn title(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn key(&self) -> Color {
        self.peach
    }

    #[must_use]
    pub const fn success(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn warning(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn border(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn selection_bg(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn selection_fg(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn hint(&self) -> Color {
        self.overlay1
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }
}

/// Look up a theme by its configured name. Unknown names get the default.
pub fn theme_from_name(name: &str) -> Theme {
    let flavor = match name {
        "Catppuccin Latte" => &PALETTE.latte,
        "Catppuccin Frappé" | "Catppuccin Frappe" => &PALETTE.frappe,
        "Catppuccin Macchiato" => &PALETTE.macchiato,
        _ => &PALETTE.mocha,
    };
    Theme::from_catppuccin(flavor)
}
