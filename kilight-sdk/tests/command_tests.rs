//! Light commands against in-memory devices

mod common;

use common::*;
use kilight_sdk::{
    project, ColorMode, EntityError, EntityKind, Integration, LightIntent, OutputId, Rgbcw,
    SdkError,
};
use kilight_session::{OutputWrite, SessionError, MAX_COLOR_TEMP, MIN_COLOR_TEMP};
use kilight_state::CoordinatorConfig;
use proptest::prelude::*;
use rstest::rstest;

async fn setup(
    state: kilight_session::DeviceState,
) -> (std::sync::Arc<kilight_session::memory::MemorySession>, Integration) {
    let session = session(state);
    let connector = connector_with(&session);
    let integration = Integration::setup(&connector, entry(), CoordinatorConfig::default())
        .await
        .unwrap();
    (session, integration)
}

#[tokio::test(start_paused = true)]
async fn brightness_on_an_off_light_is_one_write() {
    let (session, integration) = setup(single_output()).await;
    let light = integration.registry().light(OutputId::OutputA).unwrap();

    light.execute(LightIntent::set_brightness(128)).await.unwrap();

    assert_eq!(
        session.writes(),
        vec![(
            OutputId::OutputA,
            OutputWrite::new().brightness(128).power_on(true)
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn displayed_state_waits_for_the_device() {
    let (session, integration) = setup(single_output()).await;
    let light = integration.registry().light(OutputId::OutputA).unwrap();
    let before = light.value();

    light.turn_on().await.unwrap();
    assert_eq!(light.value(), before);

    session.push_current();
    let after = light.value().unwrap();
    assert!(after.as_light().unwrap().is_on);
}

#[tokio::test(start_paused = true)]
async fn commands_target_their_own_output() {
    let (session, integration) = setup(dual_output()).await;
    let light_b = integration.registry().light(OutputId::OutputB).unwrap();

    light_b.turn_off().await.unwrap();

    assert_eq!(
        session.writes(),
        vec![(OutputId::OutputB, OutputWrite::new().power_on(false))]
    );
}

#[rstest]
#[case(SessionError::Transport("connection reset".into()))]
#[case(SessionError::Disconnected)]
#[tokio::test(start_paused = true)]
async fn failed_write_is_reported(#[case] error: SessionError) {
    let (session, integration) = setup(single_output()).await;
    let light = integration.registry().light(OutputId::OutputA).unwrap();
    session.fail_writes(Some(error.clone()));

    let err = light.turn_on().await.unwrap_err();

    match err {
        SdkError::CommandFailed { name, source } => {
            assert_eq!(name, "Kitchen KiLight");
            assert_eq!(source, error);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn sensors_reject_light_commands() {
    let (session, integration) = setup(single_output()).await;
    let fan = integration.registry().find(EntityKind::FanSpeed).unwrap();

    let err = fan.turn_on().await.unwrap_err();

    assert!(matches!(
        err,
        SdkError::Entity(EntityError::NotControllable(ref id)) if id == "KL-7F3A_fan_speed"
    ));
    assert!(session.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn color_mode_follows_successful_commands() {
    let (session, integration) = setup(single_output()).await;
    let light = integration.registry().light(OutputId::OutputA).unwrap();
    assert_eq!(light.color_mode(), ColorMode::Rgbww);

    light.execute(LightIntent::set_color_temp(4000)).await.unwrap();
    assert_eq!(light.color_mode(), ColorMode::ColorTemp);

    light.execute(LightIntent::set_brightness(10)).await.unwrap();
    assert_eq!(light.color_mode(), ColorMode::ColorTemp);

    session.fail_writes(Some(SessionError::Disconnected));
    let _ = light
        .execute(LightIntent::set_rgbww(Rgbcw::new(1, 2, 3, 4, 5)))
        .await;
    assert_eq!(light.color_mode(), ColorMode::ColorTemp);

    session.fail_writes(None);
    light
        .execute(LightIntent::set_rgbww(Rgbcw::new(1, 2, 3, 4, 5)))
        .await
        .unwrap();
    assert_eq!(light.color_mode(), ColorMode::Rgbww);
}

fn arb_intent() -> impl Strategy<Value = LightIntent> {
    let turn_on = (
        proptest::option::of(any::<u8>()),
        proptest::option::of(any::<(u8, u8, u8, u8, u8)>()),
        proptest::option::of(any::<u16>()),
    )
        .prop_map(|(brightness, rgbww, color_temp_kelvin)| LightIntent::TurnOn {
            brightness,
            rgbww: rgbww.map(|(r, g, b, c, w)| Rgbcw::new(r, g, b, c, w)),
            color_temp_kelvin,
        });
    prop_oneof![Just(LightIntent::TurnOff), turn_on]
}

proptest! {
    #[test]
    fn every_turn_on_powers_the_output_on(intent in arb_intent()) {
        let projection = project(&intent);
        let expected = !matches!(intent, LightIntent::TurnOff);
        prop_assert_eq!(projection.write.power_on, Some(expected));
    }

    #[test]
    fn projected_color_temp_is_in_range(intent in arb_intent()) {
        if let Some(kelvin) = project(&intent).write.color_temp {
            prop_assert!((MIN_COLOR_TEMP..=MAX_COLOR_TEMP).contains(&kelvin));
        }
    }

    #[test]
    fn rgbww_and_color_temp_are_never_written_together(intent in arb_intent()) {
        let write = project(&intent).write;
        prop_assert!(write.rgbcw.is_none() || write.color_temp.is_none());
    }
}
