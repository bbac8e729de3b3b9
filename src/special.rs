// Rational fit in x² below |x| = 8, amplitude/phase asymptotic form above.

const ASYMPTOTIC_THRESHOLD: f64 = 8.0;
const TWO_OVER_PI: f64 = 0.636_619_772;

pub fn bessel_j0(x: f32) -> f32 {
    let x = f64::from(x);
    let ax = x.abs();

    if ax < ASYMPTOTIC_THRESHOLD {
        let y = x * x;
        let num = 57_568_490_574.0
            + y * (-13_362_590_354.0
                + y * (651_619_640.7
                    + y * (-11_214_424.18 + y * (77_392.330_17 + y * -184.905_245_6))));
        let den = 57_568_490_411.0
            + y * (1_029_532_985.0
                + y * (9_494_680.718 + y * (59_272.648_53 + y * (267.853_271_2 + y))));
        return (num / den) as f32;
    }

    let z = ASYMPTOTIC_THRESHOLD / ax;
    let y = z * z;
    let phase = ax - 0.785_398_164;
    let p = 1.0
        + y * (-0.109_862_862_7e-2
            + y * (0.273_451_040_7e-4 + y * (-0.207_337_063_9e-5 + y * 0.209_388_721_1e-6)));
    let q = -0.156_249_999_5e-1
        + y * (0.143_048_876_5e-3
            + y * (-0.691_114_765_1e-5 + y * (0.762_109_516_1e-6 - y * 0.934_935_152e-7)));

    ((TWO_OVER_PI / ax).sqrt() * (phase.cos() * p - z * phase.sin() * q)) as f32
}

pub fn bessel_j1(x: f32) -> f32 {
    let x = f64::from(x);
    let ax = x.abs();

    if ax < ASYMPTOTIC_THRESHOLD {
        let y = x * x;
        let num = x
            * (72_362_614_232.0
                + y * (-7_895_059_235.0
                    + y * (242_396_853.1
                        + y * (-2_972_611.439 + y * (15_704.482_60 + y * -30.160_366_06)))));
        let den = 144_725_228_442.0
            + y * (2_300_535_178.0
                + y * (18_583_304.74 + y * (99_447.433_94 + y * (376.999_139_7 + y))));
        return (num / den) as f32;
    }

    let z = ASYMPTOTIC_THRESHOLD / ax;
    let y = z * z;
    let phase = ax - 2.356_194_491;
    let p = 1.0
        + y * (0.183_105e-2
            + y * (-0.351_639_649_6e-4 + y * (0.245_752_017_4e-5 + y * -0.240_337_019e-6)));
    let q = 0.046_874_999_95
        + y * (-0.200_269_087_3e-3
            + y * (0.844_919_909_6e-5 + y * (-0.882_289_87e-6 + y * 0.105_787_412e-6)));

    let magnitude = (TWO_OVER_PI / ax).sqrt() * (phase.cos() * p - z * phase.sin() * q);
    (if x < 0.0 { -magnitude } else { magnitude }) as f32
}
