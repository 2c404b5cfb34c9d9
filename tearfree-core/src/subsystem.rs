//! Display subsystem bring-up
//!
//! Owns the panel (through the flush adapter), the backlight and the board
//! configuration. Bring-up order:
//!
//! 1. Validate the configuration, and that the flush strategy agrees with
//!    the tear-avoidance setting
//! 2. Backlight off, so the panel's power-on garbage is never visible
//! 3. Panel reset and init
//! 4. Orientation (axis swap, mirroring, color inversion), then a
//!    resolution check
//! 5. Vsync handler registration, on tear-avoiding boards
//! 6. Backlight to the configured duty

use embedded_hal_async::delay::DelayNs;
use tearfree_hal::{
    Backlight, BacklightError, PanelDriver, PanelError, VsyncHandler, VsyncSource,
};

use crate::config::{ConfigError, DisplayConfig};
use crate::flush::{FlushAdapter, FlushNotify, FlushOutcome};
use crate::geometry::Area;
use crate::strategy::FlushSync;

/// Display bring-up and runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BspError {
    Config(ConfigError),
    Panel(PanelError),
    Backlight(BacklightError),
    /// The panel refused the vsync handler
    VsyncRegistration,
    /// Tear avoidance is configured but no vsync source was supplied
    MissingVsync,
    /// Panel resolution differs from the configuration
    ResolutionMismatch,
    /// The flush strategy does not match `avoid_tear_effect`: a synced
    /// strategy without vsync registration would stall every flush, and
    /// direct drawing would leave the handler signalling nobody
    StrategyMismatch,
}

impl From<ConfigError> for BspError {
    fn from(e: ConfigError) -> Self {
        BspError::Config(e)
    }
}

impl From<PanelError> for BspError {
    fn from(e: PanelError) -> Self {
        BspError::Panel(e)
    }
}

impl From<BacklightError> for BspError {
    fn from(e: BacklightError) -> Self {
        BspError::Backlight(e)
    }
}

/// Initialized display
pub struct DisplaySubsystem<P: PanelDriver, B: Backlight, S: FlushSync> {
    config: DisplayConfig,
    adapter: FlushAdapter<P, S>,
    backlight: B,
    fs_active: bool,
}

impl<P: PanelDriver, B: Backlight, S: FlushSync> DisplaySubsystem<P, B, S> {
    /// Bring up a display without vsync (direct draw boards)
    pub fn init(
        config: DisplayConfig,
        panel: P,
        backlight: B,
        sync: S,
    ) -> Result<Self, BspError> {
        if config.avoid_tear_effect {
            return Err(BspError::MissingVsync);
        }
        Self::bring_up(config, panel, backlight, sync, |_| Ok(()))
    }

    /// Bring up a display and register `handler` with the vsync source
    ///
    /// The handler is only registered when `config.avoid_tear_effect` is
    /// set.
    pub fn init_with_vsync<V: VsyncSource>(
        config: DisplayConfig,
        panel: P,
        backlight: B,
        sync: S,
        vsync: &mut V,
        handler: &'static dyn VsyncHandler,
    ) -> Result<Self, BspError> {
        Self::bring_up(config, panel, backlight, sync, |avoid_tear_effect| {
            if avoid_tear_effect {
                vsync
                    .register_vsync_callback(handler)
                    .map_err(|_| BspError::VsyncRegistration)?;
            }
            Ok(())
        })
    }

    fn bring_up(
        config: DisplayConfig,
        mut panel: P,
        mut backlight: B,
        sync: S,
        register_vsync: impl FnOnce(bool) -> Result<(), BspError>,
    ) -> Result<Self, BspError> {
        config.validate()?;
        if S::SYNCED != config.avoid_tear_effect {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "Flush strategy synced={} but avoid_tear_effect={}",
                S::SYNCED,
                config.avoid_tear_effect
            );
            return Err(BspError::StrategyMismatch);
        }

        backlight.set_duty(0)?;

        panel.reset()?;
        panel.init()?;

        let (mirror_x, mirror_y) = config.orientation.mirror();
        panel.swap_xy(config.orientation.swap_xy())?;
        panel.mirror(mirror_x, mirror_y)?;
        panel.invert_color(config.invert_color)?;

        if panel.resolution() != (config.hor_res, config.ver_res) {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "Panel reports {}x{}, configured {}x{}",
                panel.resolution().0,
                panel.resolution().1,
                config.hor_res,
                config.ver_res
            );
            return Err(BspError::ResolutionMismatch);
        }

        register_vsync(config.avoid_tear_effect)?;

        backlight.set_duty(config.backlight_duty)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Display up: {}x{} {}, tear avoidance {}",
            config.hor_res,
            config.ver_res,
            config.orientation,
            config.avoid_tear_effect
        );

        Ok(Self {
            config,
            adapter: FlushAdapter::new(panel, sync),
            backlight,
            fs_active: false,
        })
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn adapter(&self) -> &FlushAdapter<P, S> {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut FlushAdapter<P, S> {
        &mut self.adapter
    }

    /// Flush a rendered area; see [`FlushAdapter::flush`]
    pub async fn flush<N: FlushNotify + ?Sized>(
        &mut self,
        area: Area,
        pixels: &[u16],
        notify: &mut N,
    ) -> FlushOutcome {
        self.adapter.flush(area, pixels, notify).await
    }

    /// Set backlight brightness (percent)
    pub fn set_brightness(&mut self, percent: u8) -> Result<(), BspError> {
        self.backlight.set_duty(percent)?;
        Ok(())
    }

    /// Filesystem clock patch currently applied
    pub fn is_fs_active(&self) -> bool {
        self.fs_active
    }

    /// Lower the pixel clock before filesystem access
    ///
    /// No-op on boards without a patch or when already lowered. Holding the
    /// subsystem mutably means no flush can run during the change.
    pub async fn access_fs<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), BspError> {
        let Some(patch) = self.config.fs_patch else {
            return Ok(());
        };
        if self.fs_active {
            return Ok(());
        }

        self.adapter.panel_mut().set_pixel_clock(patch.clock_hz)?;
        self.fs_active = true;
        delay.delay_ms(patch.settle_ms).await;
        Ok(())
    }

    /// Restore the nominal pixel clock after filesystem access
    pub async fn release_fs<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), BspError> {
        let Some(patch) = self.config.fs_patch else {
            return Ok(());
        };
        if !self.fs_active {
            return Ok(());
        }

        self.adapter
            .panel_mut()
            .set_pixel_clock(self.config.pixel_clock_hz)?;
        self.fs_active = false;
        delay.delay_ms(patch.settle_ms).await;
        Ok(())
    }
}
