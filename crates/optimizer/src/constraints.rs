//! Validity predicates applied to a combination before any compute is spent on it.

use configuration::{BollingerParams, IchimokuParams, MACrossoverParams, MacdParams, RsiParams};
use strategies::StrategyParams;

/// Whether the parameter set is worth evaluating.
pub fn is_valid(params: &StrategyParams) -> bool {
    match params {
        StrategyParams::BollingerBands(p) => bollinger_is_valid(p),
        StrategyParams::MaCrossover(p) => ma_crossover_is_valid(p),
        StrategyParams::Rsi(p) => rsi_is_valid(p),
        StrategyParams::Macd(p) => macd_is_valid(p),
        StrategyParams::Ichimoku(p) => ichimoku_is_valid(p),
    }
}

pub fn bollinger_is_valid(p: &BollingerParams) -> bool {
    p.period >= 2 && p.num_std.is_finite() && p.num_std > 0.0
}

pub fn ma_crossover_is_valid(p: &MACrossoverParams) -> bool {
    p.fast_period >= 1 && p.fast_period < p.slow_period
}

pub fn rsi_is_valid(p: &RsiParams) -> bool {
    p.period >= 1 && 0.0 <= p.oversold && p.oversold < p.overbought && p.overbought <= 100.0
}

pub fn macd_is_valid(p: &MacdParams) -> bool {
    p.fast_period >= 1 && p.fast_period < p.slow_period && p.signal_period >= 1
}

/// The classic Ichimoku proportions: each line at least twice as slow as the one before it,
/// and a displacement within half to one-and-a-half Kijun periods.
pub fn ichimoku_is_valid(p: &IchimokuParams) -> bool {
    let tenkan = p.tenkan_period as f64;
    let kijun = p.kijun_period as f64;
    let senkou_b = p.senkou_span_b_period as f64;
    let displacement = p.displacement as f64;

    p.tenkan_period >= 5
        && tenkan < kijun
        && kijun >= 2.0 * tenkan
        && kijun < senkou_b
        && senkou_b >= 2.0 * kijun
        && displacement >= 0.5 * kijun
        && displacement <= 1.5 * kijun
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ichimoku(tenkan: usize, kijun: usize, senkou_b: usize, displacement: usize) -> IchimokuParams {
        IchimokuParams {
            tenkan_period: tenkan,
            kijun_period: kijun,
            senkou_span_b_period: senkou_b,
            displacement,
        }
    }

    #[test]
    fn classic_ichimoku_settings_are_valid() {
        assert!(ichimoku_is_valid(&ichimoku(9, 26, 52, 26)));
    }

    #[test]
    fn ichimoku_rejects_each_broken_rule() {
        assert!(!ichimoku_is_valid(&ichimoku(4, 26, 52, 26)), "tenkan < 5");
        assert!(!ichimoku_is_valid(&ichimoku(9, 9, 52, 9)), "tenkan == kijun");
        assert!(!ichimoku_is_valid(&ichimoku(10, 18, 52, 18)), "kijun < 2 * tenkan");
        assert!(!ichimoku_is_valid(&ichimoku(9, 26, 26, 26)), "senkou_b == kijun");
        assert!(!ichimoku_is_valid(&ichimoku(9, 26, 50, 26)), "senkou_b < 2 * kijun");
        assert!(!ichimoku_is_valid(&ichimoku(9, 26, 52, 12)), "displacement < kijun / 2");
        assert!(!ichimoku_is_valid(&ichimoku(9, 26, 52, 40)), "displacement > 1.5 * kijun");
    }

    #[test]
    fn kijun_too_close_to_tenkan_is_rejected() {
        // 10 < 2 * 9
        assert!(!ichimoku_is_valid(&ichimoku(9, 10, 12, 26)));
        assert!(!is_valid(&StrategyParams::Ichimoku(ichimoku(9, 10, 12, 26))));
    }

    #[test]
    fn ichimoku_displacement_bounds_are_inclusive() {
        assert!(ichimoku_is_valid(&ichimoku(10, 20, 40, 10)));
        assert!(ichimoku_is_valid(&ichimoku(10, 20, 40, 30)));
    }

    #[test]
    fn fast_must_be_faster_than_slow() {
        assert!(ma_crossover_is_valid(&MACrossoverParams { fast_period: 5, slow_period: 20 }));
        assert!(!ma_crossover_is_valid(&MACrossoverParams { fast_period: 20, slow_period: 20 }));
        assert!(!macd_is_valid(&MacdParams { fast_period: 12, slow_period: 26, signal_period: 0 }));
    }

    #[test]
    fn rsi_thresholds_must_be_ordered_within_bounds() {
        assert!(rsi_is_valid(&RsiParams { period: 14, overbought: 70.0, oversold: 30.0 }));
        assert!(!rsi_is_valid(&RsiParams { period: 14, overbought: 30.0, oversold: 70.0 }));
        assert!(!rsi_is_valid(&RsiParams { period: 14, overbought: 120.0, oversold: 30.0 }));
    }

    #[test]
    fn bollinger_needs_a_real_window() {
        assert!(!bollinger_is_valid(&BollingerParams { period: 1, num_std: 2.0 }));
        assert!(!bollinger_is_valid(&BollingerParams { period: 20, num_std: 0.0 }));
    }
}
