use std::fmt::{self, Display};

use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

/// 通貨
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    INR,
    JPY,
    USD,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::INR => "₹",
            Currency::JPY => "¥",
            Currency::USD => "$",
        }
    }

    /// 小数点以下の桁数
    pub fn fraction_digits(self) -> u32 {
        match self {
            Currency::JPY => 0,
            Currency::INR | Currency::USD => 2,
        }
    }
}

/// 表示用の金額
///
/// 計算は丸めずに行い、丸めはこの型で表示するときだけ行う。
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Money {
    amount: f64,
    currency: Currency,
}

impl Money {
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn rounded(&self) -> f64 {
        let scale = 10_f64.powi(self.currency.fraction_digits() as i32);
        (self.amount * scale).round() / scale
    }

    fn minor_units(&self) -> i64 {
        let scale = 10_f64.powi(self.currency.fraction_digits() as i32);
        (self.amount.abs() * scale).round() as i64
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.currency.fraction_digits();
        let scale = 10_i64.pow(digits);
        let minor = self.minor_units();
        let sign = if self.amount < 0.0 && minor != 0 { "-" } else { "" };
        let major = (minor / scale).to_formatted_string(&Locale::en);
        match digits {
            0 => write!(f, "{}{}{}", sign, self.currency.symbol(), major),
            _ => write!(
                f,
                "{}{}{}.{:0width$}",
                sign,
                self.currency.symbol(),
                major,
                minor % scale,
                width = digits as usize
            ),
        }
    }
}
