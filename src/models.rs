use serde::Deserialize;

/// One sensor reading as served by the `thdata` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceReading {
    pub macid: String,
    pub name: String,
    #[serde(rename = "T")]
    pub temperature: f64,
    #[serde(rename = "H")]
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<DeviceReading>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_device_list() {
        let body = r#"{"devices":[{"macid":"AA:BB","name":"Sensor1","T":20,"H":50.5}]}"#;
        let list: DeviceList = serde_json::from_str(body).unwrap();

        assert_eq!(list.devices.len(), 1);
        assert_eq!(list.devices[0].macid, "AA:BB");
        assert_eq!(list.devices[0].name, "Sensor1");
        assert_eq!(list.devices[0].temperature, 20.0);
        assert_eq!(list.devices[0].humidity, 50.5);
    }

    #[test]
    fn test_missing_devices_field_is_error() {
        assert!(serde_json::from_str::<DeviceList>(r#"{"sensors":[]}"#).is_err());
    }

    #[test]
    fn test_duplicate_macids_kept_in_order() {
        let body = r#"{"devices":[
            {"macid":"AA","name":"first","T":1,"H":2},
            {"macid":"AA","name":"second","T":3,"H":4}
        ]}"#;
        let list: DeviceList = serde_json::from_str(body).unwrap();

        let names: Vec<&str> = list.devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
