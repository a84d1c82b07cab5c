//! Screener query builder.
//!
//! Filters are keyed by [`Dimension`], setting a dimension twice keeps the
//! last value. Values are given as the labels shown on the screener page
//! (`"Over 2M"`, `"Technology"`) and encoded to the website codes when the
//! query is serialized. Labels that aren't known are slugged, so raw codes
//! (`"o2000"`) can be used as well.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use thiserror::Error;

macro_rules! dimensions {
    ($(
        $(#[$doc:meta])*
        $variant:ident => $method:ident, $code:literal, [$($label:literal => $value:literal),* $(,)?];
    )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Dimension {
            $($variant),*
        }

        impl Dimension {
            pub const ALL: &'static [Dimension] = &[$(Dimension::$variant),*];

            /// Code prefix of the dimension in the `f` query parameter.
            pub fn code(self) -> &'static str {
                match self {
                    $(Dimension::$variant => $code),*
                }
            }

            /// Name of the builder method setting this dimension.
            pub fn name(self) -> &'static str {
                match self {
                    $(Dimension::$variant => stringify!($method)),*
                }
            }

            /// Known value labels along with their codes.
            pub fn values(self) -> &'static [(&'static str, &'static str)] {
                match self {
                    $(Dimension::$variant => &[$(($label, $value)),*]),*
                }
            }
        }

        /// Chainable setters shared by everything that owns a [`Query`].
        pub trait FilterBuilder {
            fn query_mut(&mut self) -> &mut Query;

            fn filter(&mut self, dimension: Dimension, value: &str) -> &mut Self {
                self.query_mut().set_filter(dimension, value);
                self
            }

            fn signal(&mut self, value: &str) -> &mut Self {
                self.query_mut().set_signal(value);
                self
            }

            fn order(&mut self, column: &str, descending: bool) -> &mut Self {
                self.query_mut().set_order(column, descending);
                self
            }

            fn clear(&mut self) -> &mut Self {
                self.query_mut().reset();
                self
            }

            $(
                $(#[$doc])*
                fn $method(&mut self, value: &str) -> &mut Self {
                    self.filter(Dimension::$variant, value)
                }
            )*
        }
    };
}

dimensions! {
    Exchange => exchange, "exch", [
        "AMEX" => "amex", "NASDAQ" => "nasd", "NYSE" => "nyse",
    ];
    Index => index, "idx", [
        "S&P 500" => "sp500", "DJIA" => "dji", "NASDAQ 100" => "ndx", "RUSSELL 2000" => "rut",
    ];
    Sector => sector, "sec", [
        "Basic Materials" => "basicmaterials",
        "Communication Services" => "communicationservices",
        "Consumer Cyclical" => "consumercyclical",
        "Consumer Defensive" => "consumerdefensive",
        "Energy" => "energy",
        "Financial" => "financial",
        "Healthcare" => "healthcare",
        "Industrials" => "industrials",
        "Real Estate" => "realestate",
        "Technology" => "technology",
        "Utilities" => "utilities",
    ];
    /// Industry names are slugged, e.g. `"Auto Parts"` becomes `autoparts`.
    Industry => industry, "ind", [];
    Country => country, "geo", [
        "USA" => "usa", "Foreign (ex-USA)" => "notusa", "Asia" => "asia",
        "Europe" => "europe", "Latin America" => "latinamerica", "BRIC" => "bric",
    ];
    MarketCap => market_cap, "cap", [
        "Mega ($200bln and more)" => "mega",
        "Large ($10bln to $200bln)" => "large",
        "Mid ($2bln to $10bln)" => "mid",
        "Small ($300mln to $2bln)" => "small",
        "Micro ($50mln to $300mln)" => "micro",
        "Nano (under $50mln)" => "nano",
        "+Large (over $10bln)" => "largeover",
        "+Mid (over $2bln)" => "midover",
        "+Small (over $300mln)" => "smallover",
        "+Micro (over $50mln)" => "microover",
        "-Large (under $200bln)" => "largeunder",
        "-Mid (under $10bln)" => "midunder",
        "-Small (under $2bln)" => "smallunder",
        "-Micro (under $300mln)" => "microunder",
    ];
    PriceEarnings => pe, "fa_pe", [
        "Low (<15)" => "low", "Profitable (>0)" => "profitable", "High (>50)" => "high",
        "Under 5" => "u5", "Under 10" => "u10", "Under 15" => "u15", "Under 20" => "u20",
        "Under 30" => "u30", "Under 50" => "u50",
        "Over 5" => "o5", "Over 10" => "o10", "Over 15" => "o15", "Over 20" => "o20",
        "Over 30" => "o30", "Over 50" => "o50",
    ];
    DividendYield => dividend_yield, "fa_div", [
        "None (0%)" => "none", "Positive (>0%)" => "pos", "High (>5%)" => "high",
        "Very High (>10%)" => "veryhigh",
        "Over 1%" => "o1", "Over 2%" => "o2", "Over 3%" => "o3", "Over 4%" => "o4",
        "Over 5%" => "o5", "Over 10%" => "o10",
    ];
    FloatShort => float_short, "sh_short", [
        "Low (<5%)" => "low", "High (>20%)" => "high",
        "Under 5%" => "u5", "Under 10%" => "u10", "Under 20%" => "u20",
        "Over 5%" => "o5", "Over 10%" => "o10", "Over 20%" => "o20", "Over 30%" => "o30",
    ];
    AnalystRecom => analyst_recom, "an_recom", [
        "Strong Buy (1)" => "strongbuy", "Buy or better" => "buybetter", "Buy" => "buy",
        "Hold or better" => "holdbetter", "Hold" => "hold", "Hold or worse" => "holdworse",
        "Sell" => "sell", "Sell or worse" => "sellworse", "Strong Sell (5)" => "strongsell",
    ];
    EarningsDate => earnings_date, "earningsdate", [
        "Today" => "today",
        "Today Before Market Open" => "todaybefore",
        "Today After Market Close" => "todayafter",
        "Tomorrow" => "tomorrow",
        "Tomorrow Before Market Open" => "tomorrowbefore",
        "Tomorrow After Market Close" => "tomorrowafter",
        "Yesterday" => "yesterday",
        "This Week" => "thisweek",
        "Next Week" => "nextweek",
        "This Month" => "thismonth",
    ];
    AverageVolume => average_volume, "sh_avgvol", [
        "Under 50K" => "u50", "Under 100K" => "u100", "Under 500K" => "u500",
        "Under 750K" => "u750", "Under 1M" => "u1000",
        "Over 50K" => "o50", "Over 100K" => "o100", "Over 200K" => "o200",
        "Over 300K" => "o300", "Over 400K" => "o400", "Over 500K" => "o500",
        "Over 750K" => "o750", "Over 1M" => "o1000", "Over 2M" => "o2000",
        "100K to 500K" => "100to500", "100K to 1M" => "100to1000",
        "500K to 1M" => "500to1000", "500K to 10M" => "500to10000",
    ];
    RelativeVolume => relative_volume, "sh_relvol", [
        "Over 10" => "o10", "Over 5" => "o5", "Over 3" => "o3", "Over 2" => "o2",
        "Over 1.5" => "o1.5", "Over 1" => "o1", "Over 0.75" => "o0.75",
        "Over 0.5" => "o0.5", "Over 0.25" => "o0.25",
        "Under 2" => "u2", "Under 1.5" => "u1.5", "Under 1" => "u1",
        "Under 0.75" => "u0.75", "Under 0.5" => "u0.5",
    ];
    CurrentVolume => current_volume, "sh_curvol", [
        "Under 50K" => "u50", "Under 100K" => "u100", "Under 500K" => "u500",
        "Under 1M" => "u1000",
        "Over 50K" => "o50", "Over 100K" => "o100", "Over 500K" => "o500",
        "Over 1M" => "o1000", "Over 2M" => "o2000", "Over 5M" => "o5000",
        "Over 10M" => "o10000", "Over 20M" => "o20000",
    ];
    Price => price, "sh_price", [
        "Under $1" => "u1", "Under $2" => "u2", "Under $3" => "u3", "Under $4" => "u4",
        "Under $5" => "u5", "Under $7" => "u7", "Under $10" => "u10", "Under $15" => "u15",
        "Under $20" => "u20", "Under $30" => "u30", "Under $40" => "u40", "Under $50" => "u50",
        "Over $1" => "o1", "Over $2" => "o2", "Over $3" => "o3", "Over $4" => "o4",
        "Over $5" => "o5", "Over $7" => "o7", "Over $10" => "o10", "Over $15" => "o15",
        "Over $20" => "o20", "Over $30" => "o30", "Over $40" => "o40", "Over $50" => "o50",
        "Over $60" => "o60", "Over $70" => "o70", "Over $80" => "o80", "Over $90" => "o90",
        "Over $100" => "o100",
        "$1 to $5" => "1to5", "$1 to $10" => "1to10", "$1 to $20" => "1to20",
        "$5 to $10" => "5to10", "$5 to $20" => "5to20", "$5 to $50" => "5to50",
        "$10 to $20" => "10to20", "$10 to $50" => "10to50", "$20 to $50" => "20to50",
        "$50 to $100" => "50to100",
    ];
    Beta => beta, "ta_beta", [
        "Under 0" => "u0", "Under 0.5" => "u0.5", "Under 1" => "u1", "Under 1.5" => "u1.5",
        "Under 2" => "u2",
        "Over 0" => "o0", "Over 0.5" => "o0.5", "Over 1" => "o1", "Over 1.5" => "o1.5",
        "Over 2" => "o2", "Over 2.5" => "o2.5", "Over 3" => "o3", "Over 4" => "o4",
        "0 to 0.5" => "0to0.5", "0 to 1" => "0to1", "0.5 to 1" => "0.5to1",
        "0.5 to 1.5" => "0.5to1.5", "1 to 1.5" => "1to1.5", "1 to 2" => "1to2",
    ];
    Rsi => rsi, "ta_rsi", [
        "Overbought (90)" => "ob90", "Overbought (80)" => "ob80",
        "Overbought (70)" => "ob70", "Overbought (60)" => "ob60",
        "Oversold (40)" => "os40", "Oversold (30)" => "os30",
        "Oversold (20)" => "os20", "Oversold (10)" => "os10",
        "Not Overbought (<60)" => "nob60", "Not Overbought (<50)" => "nob50",
        "Not Oversold (>50)" => "nos50", "Not Oversold (>40)" => "nos40",
    ];
    Performance => performance, "ta_perf", [
        "Today Up" => "dup", "Today Down" => "ddown",
        "Today -15%" => "d15u", "Today -10%" => "d10u", "Today -5%" => "d5u",
        "Today +5%" => "d5o", "Today +10%" => "d10o", "Today +15%" => "d15o",
        "Week Up" => "1wup", "Week Down" => "1wdown",
        "Month Up" => "4wup", "Month Down" => "4wdown",
        "Quarter Up" => "13wup", "Quarter Down" => "13wdown",
        "Half Up" => "26wup", "Half Down" => "26wdown",
        "Year Up" => "52wup", "Year Down" => "52wdown",
        "Year To Date Up" => "ytdup", "Year To Date Down" => "ytddown",
    ];
    OptionShort => option_short, "sh_opt", [
        "Optionable" => "option", "Shortable" => "short",
        "Optionable and shortable" => "optionshort",
    ];
}

lazy_static! {
    static ref SIGNALS: HashMap<String, &'static str> = lowercase_keys(&[
        ("Top Gainers", "ta_topgainers"),
        ("Top Losers", "ta_toplosers"),
        ("New High", "ta_newhigh"),
        ("New Low", "ta_newlow"),
        ("Most Volatile", "ta_mostvolatile"),
        ("Most Active", "ta_mostactive"),
        ("Unusual Volume", "ta_unusualvolume"),
        ("Overbought", "ta_overbought"),
        ("Oversold", "ta_oversold"),
        ("Downgrades", "n_downgrades"),
        ("Upgrades", "n_upgrades"),
        ("Earnings Before", "n_earningsbefore"),
        ("Earnings After", "n_earningsafter"),
        ("Recent Insider Buying", "it_latestbuys"),
        ("Recent Insider Selling", "it_latestsales"),
        ("Major News", "n_majornews"),
        ("Horizontal S/R", "ta_p_horizontal"),
        ("TL Resistance", "ta_p_tlresistance"),
        ("TL Support", "ta_p_tlsupport"),
        ("Wedge Up", "ta_p_wedgeup"),
        ("Wedge Down", "ta_p_wedgedown"),
        ("Triangle Ascending", "ta_p_wedgeresistance"),
        ("Triangle Descending", "ta_p_wedgesupport"),
        ("Wedge", "ta_p_wedge"),
        ("Channel Up", "ta_p_channelup"),
        ("Channel Down", "ta_p_channeldown"),
        ("Channel", "ta_p_channel"),
        ("Double Top", "ta_p_doubletop"),
        ("Double Bottom", "ta_p_doublebottom"),
        ("Multiple Top", "ta_p_multipletop"),
        ("Multiple Bottom", "ta_p_multiplebottom"),
        ("Head & Shoulders", "ta_p_headandshoulders"),
        ("Head & Shoulders Inverse", "ta_p_headandshouldersinv"),
    ]);
    static ref ORDER_COLUMNS: HashMap<String, &'static str> = lowercase_keys(&[
        ("No.", "number"),
        ("Ticker", "ticker"),
        ("Company", "company"),
        ("Sector", "sector"),
        ("Industry", "industry"),
        ("Country", "country"),
        ("Market Cap.", "marketcap"),
        ("P/E", "pe"),
        ("Price", "price"),
        ("Change", "change"),
        ("Volume", "volume"),
        ("Average Volume", "averagevolume"),
        ("Relative Volume", "relativevolume"),
        ("Dividend Yield", "dividendyield"),
        ("Float Short", "shortinterestshare"),
        ("Analyst Recom.", "recom"),
        ("Earnings Date", "earningsdate"),
    ]);
}

fn lowercase_keys(table: &[(&str, &'static str)]) -> HashMap<String, &'static str> {
    table
        .iter()
        .map(|(label, code)| (label.to_lowercase(), *code))
        .collect()
}

/// Lowercase ASCII alphanumerics (and dots, for decimal codes) of `label`.
fn slug(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Dimension {
    /// Website code of a value label for this dimension.
    pub fn encode(self, label: &str) -> String {
        let label = label.trim();
        self.values()
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(label))
            .map(|(_, code)| code.to_string())
            .unwrap_or_else(|| slug(label))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown filter dimension: {0}")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    /// Accepts builder method names (`average_volume`, `average-volume`) and
    /// website codes (`sh_avgvol`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('-', "_");
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.name() == name || d.code() == name)
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub dimension: Dimension,
    /// Value label as given to the builder
    pub value: String,
}

impl Filter {
    /// Encoded form, e.g. `sh_avgvol_o2000`.
    pub fn code(&self) -> String {
        format!("{}_{}", self.dimension.code(), self.dimension.encode(&self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn code(&self) -> String {
        let column = self.column.trim();
        let code = ORDER_COLUMNS
            .get(&column.to_lowercase())
            .map(|code| code.to_string())
            .unwrap_or_else(|| slug(column));
        if self.descending {
            format!("-{code}")
        } else {
            code
        }
    }
}

/// Accumulated screener constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
    signal: Option<String>,
    order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `dimension` to `value`, replacing any previous value in place.
    /// An empty value or `"Any"` removes the dimension.
    pub fn set_filter(&mut self, dimension: Dimension, value: &str) {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("any") {
            self.filters.retain(|f| f.dimension != dimension);
            return;
        }

        match self.filters.iter_mut().find(|f| f.dimension == dimension) {
            Some(filter) => filter.value = value.to_string(),
            None => self.filters.push(Filter {
                dimension,
                value: value.to_string(),
            }),
        }
    }

    pub fn set_signal(&mut self, value: &str) {
        let value = value.trim();
        self.signal = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    pub fn set_order(&mut self, column: &str, descending: bool) {
        let column = column.trim();
        self.order = if column.is_empty() {
            None
        } else {
            Some(Order {
                column: column.to_string(),
                descending,
            })
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn get(&self, dimension: Dimension) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.dimension == dimension)
            .map(|f| f.value.as_str())
    }

    pub fn sort_order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Value of the `f` query parameter.
    pub fn filters_code(&self) -> String {
        self.filters
            .iter()
            .map(Filter::code)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Value of the `s` query parameter, unknown signals are sent verbatim.
    pub fn signal_code(&self) -> Option<String> {
        self.signal.as_ref().map(|signal| {
            SIGNALS
                .get(&signal.to_lowercase())
                .map(|code| code.to_string())
                .unwrap_or_else(|| signal.clone())
        })
    }

    /// Snapshot of the query as request parameters, empty ones are omitted.
    pub fn to_params(&self, view: &str) -> Vec<(String, String)> {
        let mut params = vec![];
        if !view.is_empty() {
            params.push(("v".to_string(), view.to_string()));
        }
        if !self.filters.is_empty() {
            params.push(("f".to_string(), self.filters_code()));
        }
        if let Some(signal) = self.signal_code() {
            params.push(("s".to_string(), signal));
        }
        if let Some(order) = &self.order {
            params.push(("o".to_string(), order.code()));
        }
        params
    }
}

impl FilterBuilder for Query {
    fn query_mut(&mut self) -> &mut Query {
        self
    }
}
