#[cfg(test)]
mod tests {
    use sitecheck::{
        scenario_test, Error, HarnessConfiguration, RegistrationForm, RequestDescriptor,
        RequestExecutor, SimulatedRegistrationPage, StubResponse, StubRoute, StubServer,
    };
    use std::time::Duration;

    fn configure_harness(configuration: &mut HarnessConfiguration) {
        configuration.set_api_key("configured-key");
        configuration.set_default_command_timeout(Duration::from_millis(250));
    }

    #[scenario_test]
    async fn environment_configuration_scenario(
        configuration: HarnessConfiguration,
    ) -> Result<(), Error> {
        let page = SimulatedRegistrationPage::new();
        let mut form = RegistrationForm::new(&page, &configuration);

        form.visit().await?;
        form.dismiss_overlays().await
    }

    #[scenario_test(configure_harness)]
    async fn configured_scenario(configuration: HarnessConfiguration) -> Result<(), Error> {
        let server = StubServer::start(vec![StubRoute::get("/ping", |_| StubResponse::empty(204))])
            .await?;

        RequestExecutor::new(&configuration)
            .execute(RequestDescriptor::get(server.url("/ping")).failing_on_status_code())
            .await?;

        match server.requests().first().and_then(|r| r.header("x-api-key")) {
            Some("configured-key") => Ok(()),
            other => panic!("unexpected api key {:?}", other),
        }
    }

    #[scenario_test]
    #[should_panic(expected = "Scenario failed")]
    async fn failing_scenario(configuration: HarnessConfiguration) -> Result<(), Error> {
        let page = SimulatedRegistrationPage::new();
        let mut form = RegistrationForm::new(&page, &configuration);

        form.verify_success().await
    }
}
