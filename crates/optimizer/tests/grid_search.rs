use backtester::Backtester;
use chrono::{Duration, TimeZone, Utc};
use configuration::{
    Config, IchimokuParams, MACrossoverParams, ParameterDef, ParameterRange, Strategies,
};
use core_types::{Bar, DateRange, PriceSeries, StrategyId};
use optimizer::error::OptimizerError;
use optimizer::GridSearchOptimizer;
use std::sync::Arc;
use strategies::StrategyParams;

fn series(timeframe: &str, len: usize, close: impl Fn(f64) -> f64) -> Arc<PriceSeries> {
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    let bars = (0..len)
        .map(|i| {
            let c = close(i as f64);
            Bar {
                timestamp: start + Duration::hours(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1.0,
            }
        })
        .collect();
    Arc::new(PriceSeries::new("BTC/USDT", timeframe, bars).unwrap())
}

fn wave(timeframe: &str) -> Arc<PriceSeries> {
    series(timeframe, 300, |x| 200.0 + 15.0 * (x / 11.0).sin() + 6.0 * (x / 4.0).cos() + 0.1 * x)
}

fn ma_space(fast: Vec<i64>, slow: Vec<i64>) -> Vec<ParameterDef> {
    vec![
        ParameterDef::new("fast_period", ParameterRange::DiscreteInt(fast)),
        ParameterDef::new("slow_period", ParameterRange::DiscreteInt(slow)),
    ]
}

fn ma_base() -> StrategyParams {
    StrategyParams::MaCrossover(MACrossoverParams::default())
}

#[test]
fn ties_go_to_the_first_enumerated_combination() {
    let flat = series("1h", 50, |_| 100.0);
    let optimizer = GridSearchOptimizer::new(ma_base(), ma_space(vec![2, 3], vec![5, 6]));

    let outcome = optimizer.run(&[flat]).unwrap();
    let best = outcome.best.unwrap().1;

    assert_eq!(best.total_profit, 0.0);
    assert_eq!(
        best.params,
        StrategyParams::MaCrossover(MACrossoverParams { fast_period: 2, slow_period: 5 })
    );
}

#[test]
fn best_matches_exhaustive_sequential_evaluation() {
    let data = wave("1h");
    let space = ma_space(vec![2, 4, 6, 8], vec![10, 15, 20, 30]);
    let optimizer = GridSearchOptimizer::new(ma_base(), space).with_workers(3);

    let outcome = optimizer.run(&[Arc::clone(&data)]).unwrap();
    let best = outcome.best.unwrap().1;

    let mut expected: Option<(f64, StrategyParams)> = None;
    for params in optimizer.candidates().unwrap() {
        let profit = Backtester::from_params(params)
            .unwrap()
            .with_data(Arc::clone(&data))
            .get_performance_metrics()
            .unwrap()
            .total_profit;
        if expected.is_none_or(|(p, _)| profit > p) {
            expected = Some((profit, params));
        }
    }
    let (profit, params) = expected.unwrap();
    assert_eq!(best.params, params);
    assert_eq!(best.total_profit.to_bits(), profit.to_bits());
}

#[test]
fn result_does_not_depend_on_worker_count() {
    let data = wave("1h");
    let space = ma_space(vec![2, 3, 5, 8], vec![13, 21, 34]);

    let single = GridSearchOptimizer::new(ma_base(), space.clone())
        .with_workers(1)
        .run(&[Arc::clone(&data)])
        .unwrap();
    let many = GridSearchOptimizer::new(ma_base(), space)
        .with_workers(4)
        .run(&[data])
        .unwrap();

    assert_eq!(single.best, many.best);
}

#[test]
fn invalid_ichimoku_combinations_are_skipped() {
    let base = StrategyParams::Ichimoku(IchimokuParams::default());
    let space = vec![
        ParameterDef::new("tenkan_period", ParameterRange::DiscreteInt(vec![4, 9, 14])),
        ParameterDef::new("kijun_period", ParameterRange::DiscreteInt(vec![26])),
    ];
    let outcome = GridSearchOptimizer::new(base, space).run(&[wave("1h")]).unwrap();
    let tf = &outcome.timeframes[0];

    // tenkan 4 is below the minimum, and 2 * 14 > 26.
    assert_eq!(tf.total, 3);
    assert_eq!(tf.skipped, 2);
    assert_eq!(tf.evaluated, 1);
    assert_eq!(tf.failed, 0);
    match tf.best.as_ref().unwrap().params {
        StrategyParams::Ichimoku(p) => assert_eq!(p.tenkan_period, 9),
        other => panic!("unexpected params {:?}", other),
    }
}

#[test]
fn all_invalid_grid_has_no_best() {
    let space = ma_space(vec![20], vec![10]);
    let outcome = GridSearchOptimizer::new(ma_base(), space).run(&[wave("1h")]).unwrap();
    assert!(outcome.best.is_none());
    assert_eq!(outcome.timeframes[0].skipped, 1);
}

#[test]
fn global_best_tracks_timeframes_and_prefers_the_earlier_on_ties() {
    let space = ma_space(vec![2], vec![5]);
    let flat = series("1h", 60, |_| 100.0);
    let rising = series("4h", 60, |x| 100.0 + x);

    let outcome = GridSearchOptimizer::new(ma_base(), space.clone())
        .run(&[flat, rising])
        .unwrap();
    assert_eq!(outcome.timeframes.len(), 2);
    assert_eq!(outcome.best.as_ref().unwrap().0, "4h");
    assert!(outcome.best.unwrap().1.total_profit > 0.0);

    let outcome = GridSearchOptimizer::new(ma_base(), space)
        .run(&[wave("15m"), wave("1d")])
        .unwrap();
    assert_eq!(outcome.best.unwrap().0, "15m");
}

#[test]
fn empty_series_is_fatal() {
    let empty = Arc::new(PriceSeries::new("BTC/USDT", "1h", vec![]).unwrap());
    let err = GridSearchOptimizer::new(ma_base(), vec![]).run(&[wave("4h"), empty]).unwrap_err();
    match err {
        OptimizerError::DataUnavailable { symbol, timeframe } => {
            assert_eq!(symbol, "BTC/USDT");
            assert_eq!(timeframe, "1h");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn fetch_failure_aborts_the_search() {
    let optimizer = GridSearchOptimizer::new(ma_base(), ma_space(vec![2], vec![5]));
    let timeframes = vec!["1h".to_string(), "4h".to_string()];

    let err = optimizer
        .run_fetching("BTC/USDT", &timeframes, DateRange::default(), |tf| {
            if tf == "4h" {
                Err(std::io::Error::other("exchange unavailable"))
            } else {
                Ok(wave(tf).as_ref().clone())
            }
        })
        .unwrap_err();

    assert!(matches!(err, OptimizerError::DataFetch { ref timeframe, .. } if timeframe == "4h"));
}

#[test]
fn unknown_parameter_fails_before_evaluation() {
    let space = vec![ParameterDef::new("lookback", ParameterRange::DiscreteInt(vec![5]))];
    let err = GridSearchOptimizer::new(ma_base(), space).run(&[wave("1h")]).unwrap_err();
    assert!(matches!(err, OptimizerError::ParameterGeneration(_)));
}

#[test]
fn from_config_uses_the_historical_ichimoku_grid() {
    let config = Config {
        strategies: Strategies::default(),
        ..Config::default()
    };
    let optimizer = GridSearchOptimizer::from_config(StrategyId::Ichimoku, &config);
    assert_eq!(optimizer.candidates().unwrap().len(), 14 * 21 * 41 * 6);
    assert_eq!(optimizer.strategy_id(), StrategyId::Ichimoku);

    let optimizer = GridSearchOptimizer::from_config(StrategyId::Rsi, &config);
    assert_eq!(optimizer.candidates().unwrap().len(), 1);
}
