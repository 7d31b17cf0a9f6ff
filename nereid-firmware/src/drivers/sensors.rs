//! Depth and attitude sensors on the shared I2C bus
//!
//! MS5837 pressure sensor at 0x76, MPU-6050 IMU at 0x68, both on
//! I2C0 at 400 kHz. Pressure conversions run at OSR 1024: roughly
//! 2.3 ms each, short enough for two of them to live inside the 20 ms
//! control period.

use embassy_time::{block_for, Duration, Instant};
use embedded_hal::i2c::I2c;
use nereid_core::traits::{AttitudeReading, DepthReading, Imu, PressureSensor};

const MS5837_ADDR: u8 = 0x76;
const MPU6050_ADDR: u8 = 0x68;

const CMD_RESET: u8 = 0x1E;
const CMD_PROM_BASE: u8 = 0xA0;
const CMD_CONV_D1: u8 = 0x44; // OSR 1024
const CMD_CONV_D2: u8 = 0x54; // OSR 1024
const CMD_ADC_READ: u8 = 0x00;
const CONV_TIME_MS: u64 = 3;

const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_SMPLRT_DIV: u8 = 0x19;
const REG_CONFIG: u8 = 0x1A;
const REG_GYRO_CFG: u8 = 0x1B;
const REG_ACCEL_CFG: u8 = 0x1C;
const REG_ACCEL_XOUT: u8 = 0x3B;

/// Complementary filter gyro weight
const ALPHA: f32 = 0.98;
const DEG_PER_RAD: f32 = 57.295_78;

/// Surface pressure in sensor units (0.1 mbar)
const P_SURFACE: i32 = 10_133;

/// Both I2C sensors behind one bus
pub struct Sensors<BUS> {
    bus: BUS,
    cal: [u16; 7],
    pitch_deg: f32,
    roll_deg: f32,
    last_imu: Instant,
}

impl<BUS: I2c> Sensors<BUS> {
    /// Reset the pressure sensor and read its calibration PROM
    pub fn new(mut bus: BUS) -> Result<Self, BUS::Error> {
        bus.write(MS5837_ADDR, &[CMD_RESET])?;
        block_for(Duration::from_millis(10));

        let mut cal = [0u16; 7];
        for (i, word) in cal.iter_mut().enumerate() {
            let mut buf = [0u8; 2];
            bus.write_read(MS5837_ADDR, &[CMD_PROM_BASE + (i as u8) * 2], &mut buf)?;
            *word = u16::from_be_bytes(buf);
        }

        Ok(Self {
            bus,
            cal,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            last_imu: Instant::now(),
        })
    }

    /// Wake the IMU and configure sample rate, filtering and ranges
    pub fn init_imu(&mut self) -> Result<(), BUS::Error> {
        self.write_imu_reg(REG_PWR_MGMT_1, 0x00)?;
        block_for(Duration::from_millis(100));
        // 100 Hz sample rate: 8 kHz / (1 + 79)
        self.write_imu_reg(REG_SMPLRT_DIV, 79)?;
        // DLPF at ~44 Hz bandwidth
        self.write_imu_reg(REG_CONFIG, 0x03)?;
        // Gyro range +/-500 deg/s
        self.write_imu_reg(REG_GYRO_CFG, 0x08)?;
        // Accel range +/-4 g
        self.write_imu_reg(REG_ACCEL_CFG, 0x08)?;

        self.pitch_deg = 0.0;
        self.roll_deg = 0.0;
        self.last_imu = Instant::now();
        Ok(())
    }

    fn write_imu_reg(&mut self, reg: u8, value: u8) -> Result<(), BUS::Error> {
        self.bus.write(MPU6050_ADDR, &[reg, value])
    }

    fn convert_and_read(&mut self, cmd: u8) -> Result<u32, BUS::Error> {
        self.bus.write(MS5837_ADDR, &[cmd])?;
        block_for(Duration::from_millis(CONV_TIME_MS));

        let mut buf = [0u8; 3];
        self.bus
            .write_read(MS5837_ADDR, &[CMD_ADC_READ], &mut buf)?;
        Ok(u32::from(buf[0]) << 16 | u32::from(buf[1]) << 8 | u32::from(buf[2]))
    }

    /// First-order pressure compensation per the MS5837 datasheet
    fn depth_from_samples(&self, d1: u32, d2: u32) -> i32 {
        let dt = d2 as i64 - ((self.cal[5] as i64) << 8);
        let off = ((self.cal[2] as i64) << 16) + ((self.cal[4] as i64 * dt) >> 7);
        let sens = ((self.cal[1] as i64) << 15) + ((self.cal[3] as i64 * dt) >> 8);
        let p = ((((d1 as i64 * sens) >> 21) - off) >> 13) as i32;

        // p is in 0.1 mbar; one cm of water is 0.978 of those units
        (p - P_SURFACE) * 100 / 978
    }
}

impl<BUS: I2c> PressureSensor for Sensors<BUS> {
    fn read(&mut self) -> DepthReading {
        let d1 = match self.convert_and_read(CMD_CONV_D1) {
            Ok(v) => v,
            Err(_) => return DepthReading::default(),
        };
        let d2 = match self.convert_and_read(CMD_CONV_D2) {
            Ok(v) => v,
            Err(_) => return DepthReading::default(),
        };

        DepthReading {
            depth_cm: self.depth_from_samples(d1, d2),
            valid: true,
        }
    }
}

impl<BUS: I2c> Imu for Sensors<BUS> {
    fn read(&mut self) -> AttitudeReading {
        let mut data = [0u8; 14];
        if self
            .bus
            .write_read(MPU6050_ADDR, &[REG_ACCEL_XOUT], &mut data)
            .is_err()
        {
            return AttitudeReading::default();
        }

        let ax = i16::from_be_bytes([data[0], data[1]]) as f32 / 8192.0;
        let ay = i16::from_be_bytes([data[2], data[3]]) as f32 / 8192.0;
        let az = i16::from_be_bytes([data[4], data[5]]) as f32 / 8192.0;
        let gx = i16::from_be_bytes([data[8], data[9]]) as f32 / 65.5;
        let gy = i16::from_be_bytes([data[10], data[11]]) as f32 / 65.5;

        let now = Instant::now();
        let dt = clamp_dt((now - self.last_imu).as_micros() as f32 / 1_000_000.0);
        self.last_imu = now;

        let accel_pitch = libm::atan2f(-ax, libm::sqrtf(ay * ay + az * az)) * DEG_PER_RAD;
        let accel_roll = libm::atan2f(ay, az) * DEG_PER_RAD;

        // Complementary filter: gyro integration with a slow
        // accelerometer correction pulling out the drift
        self.pitch_deg = ALPHA * (self.pitch_deg + gy * dt) + (1.0 - ALPHA) * accel_pitch;
        self.roll_deg = ALPHA * (self.roll_deg + gx * dt) + (1.0 - ALPHA) * accel_roll;

        AttitudeReading {
            pitch_x10: (self.pitch_deg * 10.0) as i16,
            roll_x10: (self.roll_deg * 10.0) as i16,
            valid: true,
        }
    }
}

fn clamp_dt(dt: f32) -> f32 {
    if dt <= 0.0 || dt > 0.5 {
        0.02
    } else {
        dt
    }
}
